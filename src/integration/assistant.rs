//! The assistant's main loop
//!
//! Connects all components: Listener -> Dispatcher -> Responder, with the
//! command store, reminder scheduler and web services behind the dispatcher.

use crate::commands::CommandStore;
use crate::dispatch::{Dispatcher, Outcome};
use crate::integration::config::{AssistantConfig, RecognizerConfig, SpeechConfig};
use crate::reminders::ReminderScheduler;
use crate::services::{OpenWeatherClient, Services, SmtpMailer, WikipediaClient};
use crate::speech::{
    normalize_utterance, KeyboardInput, Listener, Recognizer, Responder, SpeechResponder,
    TextInput,
};
use crate::{Result, SaysoError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Runs the listen → dispatch loop until an exit phrase or end of input
pub struct Assistant {
    dispatcher: Dispatcher,
    listener: Listener,
    responder: Arc<dyn Responder>,
}

impl Assistant {
    pub fn new(dispatcher: Dispatcher, listener: Listener, responder: Arc<dyn Responder>) -> Self {
        Self {
            dispatcher,
            listener,
            responder,
        }
    }

    pub fn responder(&self) -> Arc<dyn Responder> {
        Arc::clone(&self.responder)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run until the user says an exit phrase or input ends
    ///
    /// Recoverable errors, from reading the next command or from running
    /// it, are logged and answered with a generic apology. Anything else is
    /// explained to the user and ends the loop with `Err`.
    pub fn run(&mut self) -> Result<()> {
        self.responder.say("Voice assistant activated.");
        println!("Speak a command or type one. Say 'exit' to stop.");

        loop {
            let outcome = self
                .next_utterance()
                .and_then(|utterance| self.dispatcher.dispatch(&utterance, &mut self.listener));

            match outcome {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Exit) => {
                    info!("Exit requested");
                    return Ok(());
                }
                Err(SaysoError::InputClosed) => {
                    info!("Input closed, shutting down");
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    error!("Processing error: {}", e);
                    self.responder
                        .say("An error occurred while processing your command.");
                }
                Err(e) => {
                    error!("Fatal error: {}", e);
                    self.responder.say(&e.user_message());
                    return Err(e);
                }
            }
        }
    }

    /// One utterance, with a second typed chance when the first is empty
    fn next_utterance(&mut self) -> Result<String> {
        let utterance = self.listener.listen()?;
        if !utterance.is_empty() {
            return Ok(utterance);
        }
        let typed = self.listener.read_text("Type command: ")?;
        Ok(normalize_utterance(&typed))
    }
}

/// Builder for wiring an assistant from configuration
///
/// Every component can be replaced before `build`; anything left unset is
/// created from the configuration.
pub struct AssistantBuilder {
    config: AssistantConfig,
    responder: Option<Arc<dyn Responder>>,
    recognizer: Option<Box<dyn Recognizer>>,
    keyboard: Option<Box<dyn TextInput>>,
    services: Option<Services>,
    reminder_minute: Option<Duration>,
}

impl AssistantBuilder {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            config,
            responder: None,
            recognizer: None,
            keyboard: None,
            services: None,
            reminder_minute: None,
        }
    }

    pub fn with_responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = Some(responder);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn Recognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_keyboard(mut self, keyboard: Box<dyn TextInput>) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn with_services(mut self, services: Services) -> Self {
        self.services = Some(services);
        self
    }

    /// Shorten reminder minutes, for tests
    pub fn with_reminder_minute(mut self, minute: Duration) -> Self {
        self.reminder_minute = Some(minute);
        self
    }

    pub fn build(self) -> Result<Assistant> {
        let config = self.config;

        let responder = match self.responder {
            Some(responder) => responder,
            None => build_responder(&config.speech)?,
        };

        let recognizer = match self.recognizer {
            Some(recognizer) => Some(recognizer),
            None => build_recognizer(&config.recognizer)?,
        };
        let keyboard = self
            .keyboard
            .unwrap_or_else(|| Box::new(KeyboardInput) as Box<dyn TextInput>);
        let listener = Listener::new(recognizer, keyboard, Arc::clone(&responder));

        let services = match self.services {
            Some(services) => services,
            None => build_services(&config)?,
        };

        let store = CommandStore::open(config.commands.file.clone());

        let mut reminders = ReminderScheduler::new(Arc::clone(&responder));
        if let Some(minute) = self.reminder_minute {
            reminders = reminders.with_minute(minute);
        }

        let dispatcher = Dispatcher::new(
            store,
            Arc::clone(&responder),
            services,
            reminders,
            config.weather.default_city.clone(),
        );

        Ok(Assistant::new(dispatcher, listener, responder))
    }
}

fn build_services(config: &AssistantConfig) -> Result<Services> {
    let weather = OpenWeatherClient::new(&config.weather)
        .map_err(|e| SaysoError::ConfigError(format!("Failed to create weather client: {}", e)))?;
    let encyclopedia = WikipediaClient::new()
        .map_err(|e| SaysoError::ConfigError(format!("Failed to create lookup client: {}", e)))?;

    if config.weather.api_key.is_none() {
        warn!("No weather API key configured, weather requests will be refused");
    }
    if config.mail.address.is_none() || config.mail.password.is_none() {
        warn!("No email credentials configured, email requests will be refused");
    }

    Ok(Services {
        weather: Box::new(weather),
        encyclopedia: Box::new(encyclopedia),
        mail: Box::new(SmtpMailer::new(config.mail.clone())),
    })
}

#[cfg(feature = "speech-out")]
fn build_responder(config: &SpeechConfig) -> Result<Arc<dyn Responder>> {
    if !config.enabled {
        return Ok(Arc::new(SpeechResponder::console()));
    }

    let synthesizer = crate::speech::VitsSynthesizer::start(config.clone())?;
    info!("Speech output enabled");
    Ok(Arc::new(SpeechResponder::with_synthesizer(Box::new(synthesizer))))
}

#[cfg(not(feature = "speech-out"))]
fn build_responder(config: &SpeechConfig) -> Result<Arc<dyn Responder>> {
    if config.enabled {
        warn!("Speech output requested but sayso was built without the `speech-out` feature");
    }
    Ok(Arc::new(SpeechResponder::console()))
}

#[cfg(feature = "voice")]
fn build_recognizer(config: &RecognizerConfig) -> Result<Option<Box<dyn Recognizer>>> {
    if !config.enabled {
        info!("Voice input disabled, reading commands from the keyboard");
        return Ok(None);
    }

    let recognizer = crate::speech::MicrophoneRecognizer::new(config)?;
    info!("Voice input enabled ({})", config.model_path.display());
    Ok(Some(Box::new(recognizer)))
}

#[cfg(not(feature = "voice"))]
fn build_recognizer(config: &RecognizerConfig) -> Result<Option<Box<dyn Recognizer>>> {
    if config.enabled {
        warn!("Voice input requested but sayso was built without the `voice` feature");
    }
    Ok(None)
}

/// Speak a goodbye and exit cleanly on Ctrl-C
///
/// The signal is awaited on a current-thread tokio runtime in its own thread,
/// so the blocking main loop never has to poll for it.
pub fn install_interrupt_handler(responder: Arc<dyn Responder>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("interrupt-watcher".to_string())
        .spawn(move || {
            if let Err(e) = runtime.block_on(tokio::signal::ctrl_c()) {
                warn!("Cannot listen for Ctrl-C: {}", e);
                return;
            }
            info!("Interrupted");
            responder.say("Interrupted. Goodbye.");
            std::process::exit(0);
        })?;

    Ok(())
}
