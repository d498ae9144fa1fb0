//! External services the dispatcher talks to
//!
//! Each service is a trait with a single request/response call so the
//! dispatcher can be driven by fakes in tests. The real clients are
//! blocking: the main loop processes one command at a time anyway.

pub mod encyclopedia;
pub mod mail;
pub mod weather;

pub use encyclopedia::{EncyclopediaService, LookupError, WikipediaClient};
pub use mail::{MailError, MailService, OutgoingMail, SmtpMailer};
pub use weather::{OpenWeatherClient, WeatherError, WeatherReport, WeatherService};

/// The set of services one dispatcher uses
pub struct Services {
    pub weather: Box<dyn WeatherService>,
    pub encyclopedia: Box<dyn EncyclopediaService>,
    pub mail: Box<dyn MailService>,
}
