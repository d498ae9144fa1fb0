use super::conversation::{Conversation, Slot};
use super::intent::Intent;
use super::parse::{format_date, format_time, parse_minutes};
use crate::commands::{CommandStore, UpsertOutcome};
use crate::reminders::ReminderScheduler;
use crate::services::{LookupError, MailError, OutgoingMail, Services, WeatherError};
use crate::speech::{Listener, Responder};
use crate::Result;
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const HELP_TEXT: &str = "You can ask time, date, weather, set reminders, send email, ask Wikipedia, or add custom commands.";
pub const UNKNOWN_TEXT: &str =
    "Sorry, I didn't understand that. You can say help to get a list of commands.";

/// What the main loop should do after a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// Routes one utterance to its handler and speaks the result
///
/// Service failures are answered here. Only listener errors (closed input,
/// broken keyboard) come back as `Err`.
pub struct Dispatcher {
    store: CommandStore,
    responder: Arc<dyn Responder>,
    services: Services,
    reminders: ReminderScheduler,
    default_city: String,
}

impl Dispatcher {
    pub fn new(
        store: CommandStore,
        responder: Arc<dyn Responder>,
        services: Services,
        reminders: ReminderScheduler,
        default_city: impl Into<String>,
    ) -> Self {
        Self {
            store,
            responder,
            services,
            reminders,
            default_city: default_city.into(),
        }
    }

    pub fn store(&self) -> &CommandStore {
        &self.store
    }

    pub fn dispatch(&self, utterance: &str, listener: &mut Listener) -> Result<Outcome> {
        let intent = Intent::classify(utterance, &self.store);
        debug!("'{}' -> {:?}", utterance, intent);

        match intent {
            Intent::Empty => {}
            Intent::Exit => {
                self.say("Goodbye. Exiting now.");
                return Ok(Outcome::Exit);
            }
            Intent::Custom { response } => self.say(&response),
            Intent::Greeting => self.say("Hello! How can I help you?"),
            Intent::Time => {
                let now = Local::now().naive_local();
                self.say(&format!("The current time is {}", format_time(&now)));
            }
            Intent::Date => {
                let now = Local::now().naive_local();
                self.say(&format!("Today's date is {}", format_date(&now)));
            }
            Intent::Weather { city } => self.weather(city, listener)?,
            Intent::Email => self.email(listener)?,
            Intent::Reminder => self.reminder(listener)?,
            Intent::Lookup { query } => self.lookup(query, listener)?,
            Intent::AddCommand => self.add_command(listener)?,
            Intent::Help => self.say(HELP_TEXT),
            Intent::Unknown => self.say(UNKNOWN_TEXT),
        }

        Ok(Outcome::Continue)
    }

    fn say(&self, text: &str) {
        self.responder.say(text);
    }

    fn conversation<'a>(&'a self, listener: &'a mut Listener) -> Conversation<'a> {
        Conversation::new(listener, self.responder.as_ref())
    }

    fn weather(&self, city: Option<String>, listener: &mut Listener) -> Result<()> {
        let city = match city {
            Some(city) => city,
            None => {
                let mut conversation = self.conversation(listener);
                if conversation.ask(Slot::City, "Which city do you want the weather for?")? {
                    conversation.take(Slot::City)
                } else {
                    self.default_city.clone()
                }
            }
        };

        match self.services.weather.current(&city) {
            Ok(report) => self.say(&report.sentence(&city)),
            Err(WeatherError::MissingApiKey) => {
                warn!("Weather requested but no API key is configured");
                self.say("Weather API key not set.");
            }
            Err(WeatherError::Service { message }) => {
                self.say(&format!("Could not fetch weather for {}. {}", city, message));
            }
            Err(e @ WeatherError::Network(_)) => {
                error!("Weather lookup for {} failed: {}", city, e);
                self.say("Sorry, I couldn't get the weather right now.");
            }
        }
        Ok(())
    }

    fn email(&self, listener: &mut Listener) -> Result<()> {
        let mut conversation = self.conversation(listener);

        let has_recipient = conversation.ask_typed(
            Slot::Recipient,
            "Who is the recipient? Please type recipient email address:",
            "Recipient email: ",
        )?;
        if !has_recipient {
            conversation.say("No recipient provided. Cancelled.");
            return Ok(());
        }
        conversation.ask(Slot::Subject, "What is the subject?")?;
        conversation.ask(Slot::Body, "What should I say in the email?")?;

        let mail = OutgoingMail {
            to: conversation.take(Slot::Recipient),
            subject: conversation.take(Slot::Subject),
            body: conversation.take(Slot::Body),
        };
        match self.services.mail.send(&mail) {
            Ok(()) => self.say("Email sent successfully."),
            Err(MailError::MissingCredentials) => {
                warn!("Email requested but no credentials are configured");
                self.say("Email credentials are not set. Please configure them.");
            }
            Err(e) => {
                error!("Sending email to {} failed: {}", mail.to, e);
                self.say("Failed to send the email. Check credentials or network.");
            }
        }
        Ok(())
    }

    fn reminder(&self, listener: &mut Listener) -> Result<()> {
        let mut conversation = self.conversation(listener);

        if !conversation.ask(Slot::ReminderText, "What should I remind you about?")? {
            conversation.say("No reminder text received. Cancelled.");
            return Ok(());
        }
        conversation.ask(
            Slot::ReminderMinutes,
            "In how many minutes should I remind you?",
        )?;

        let minutes = conversation
            .answer(Slot::ReminderMinutes)
            .and_then(parse_minutes);
        let Some(minutes) = minutes else {
            conversation.say("I couldn't understand the time. Reminder not set.");
            return Ok(());
        };

        let text = conversation.take(Slot::ReminderText);
        match self.reminders.schedule(&text, minutes) {
            Ok(_) => self.say(&format!("Reminder set for {} minutes from now.", minutes)),
            Err(e) => {
                error!("{}", e);
                self.say(&e.user_message());
            }
        }
        Ok(())
    }

    fn lookup(&self, query: Option<String>, listener: &mut Listener) -> Result<()> {
        let query = match query {
            Some(query) => query,
            None => {
                let mut conversation = self.conversation(listener);
                if !conversation.ask(Slot::Query, "What would you like to know about?")? {
                    conversation.say("No topic received. Cancelled.");
                    return Ok(());
                }
                conversation.take(Slot::Query)
            }
        };

        match self.services.encyclopedia.summary(&query) {
            Ok(summary) => self.say(&summary),
            Err(e) => {
                match &e {
                    LookupError::NotFound(_) => debug!("{}", e),
                    LookupError::Network(_) => error!("Lookup for '{}' failed: {}", query, e),
                }
                self.say("I couldn't find a Wikipedia answer for that.");
            }
        }
        Ok(())
    }

    fn add_command(&self, listener: &mut Listener) -> Result<()> {
        let mut conversation = self.conversation(listener);

        if !conversation.ask(Slot::Trigger, "What phrase should trigger the command?")? {
            conversation.say("No trigger received. Cancelled.");
            return Ok(());
        }
        if !conversation.ask(Slot::Response, "What should I respond when you say that?")? {
            conversation.say("No response provided. Cancelled.");
            return Ok(());
        }

        let trigger = conversation.take(Slot::Trigger);
        let response = conversation.take(Slot::Response);
        match self.store.upsert(&trigger, &response) {
            UpsertOutcome::Stored { persisted } => {
                if !persisted {
                    warn!("Custom command '{}' is only kept until exit", trigger);
                }
                self.say(&format!("Custom command added for trigger: {}", trigger));
            }
            // Both answers were checked above, so only whitespace gets here
            UpsertOutcome::Cancelled => self.say("No trigger received. Cancelled."),
        }
        Ok(())
    }
}
