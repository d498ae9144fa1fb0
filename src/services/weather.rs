//! Current weather from OpenWeatherMap

use crate::integration::config::WeatherConfig;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const OPENWEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Current conditions for one city
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Degrees Celsius
    pub temperature: f64,
    pub description: String,
}

impl WeatherReport {
    /// One spoken sentence describing the report
    pub fn sentence(&self, city: &str) -> String {
        format!(
            "In {}, the temperature is {}°C with {}.",
            city,
            self.temperature.round() as i64,
            self.description
        )
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API key not set")]
    MissingApiKey,

    /// The service answered but refused, e.g. unknown city
    #[error("Weather service error: {message}")]
    Service { message: String },

    #[error("Network error: {0}")]
    Network(String),
}

pub trait WeatherService {
    fn current(&self, city: &str) -> Result<WeatherReport, WeatherError>;
}

pub struct OpenWeatherClient {
    api_key: Option<String>,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: Option<MainSection>,
    #[serde(default)]
    weather: Vec<Condition>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("sayso/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            http,
        })
    }
}

impl WeatherService for OpenWeatherClient {
    fn current(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        debug!("Fetching weather for {}", city);
        let response = self
            .http
            .get(OPENWEATHER_URL)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .map_err(|e| WeatherError::Network(format!("Invalid response: {}", e)))?;

        if !status.is_success() {
            return Err(WeatherError::Service {
                message: body.message.unwrap_or_default(),
            });
        }

        parse_report(body)
    }
}

fn parse_report(body: ApiResponse) -> Result<WeatherReport, WeatherError> {
    let temperature = body
        .main
        .map(|main| main.temp)
        .ok_or_else(|| WeatherError::Network("Response has no temperature".to_string()))?;
    let description = body
        .weather
        .into_iter()
        .next()
        .map(|condition| condition.description)
        .ok_or_else(|| WeatherError::Network("Response has no conditions".to_string()))?;

    Ok(WeatherReport {
        temperature,
        description,
    })
}
