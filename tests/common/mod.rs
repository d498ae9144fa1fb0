//! Scripted fakes for driving the dispatcher and assistant without audio,
//! network or a terminal

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use sayso::commands::CommandStore;
use sayso::dispatch::{Dispatcher, Outcome};
use sayso::reminders::ReminderScheduler;
use sayso::services::{
    EncyclopediaService, LookupError, MailError, MailService, OutgoingMail, Services,
    WeatherError, WeatherReport, WeatherService,
};
use sayso::speech::{Listener, Recognizer, Responder, TextInput};
use sayso::{Result, SaysoError};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Records everything said and forwards it to a channel for cross-thread waits
pub struct RecordingResponder {
    said: Mutex<Vec<String>>,
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl RecordingResponder {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = unbounded();
        Arc::new(Self {
            said: Mutex::new(Vec::new()),
            tx,
            rx,
        })
    }

    pub fn said(&self) -> Vec<String> {
        self.said.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.said.lock().last().cloned()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.said.lock().iter().any(|said| said == text)
    }

    /// Wait until `text` is said, from any thread
    pub fn wait_for(&self, text: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(said) if said == text => return true,
                Ok(_) => continue,
                Err(_) => return false,
            }
        }
    }
}

impl Responder for RecordingResponder {
    fn say(&self, text: &str) {
        self.said.lock().push(text.to_string());
        let _ = self.tx.send(text.to_string());
    }
}

/// Hands out scripted transcriptions; `None` is a timeout
pub struct ScriptedRecognizer(pub VecDeque<Option<String>>);

impl ScriptedRecognizer {
    pub fn new(heard: &[Option<&str>]) -> Self {
        Self(heard.iter().map(|h| h.map(str::to_string)).collect())
    }
}

impl Recognizer for ScriptedRecognizer {
    fn recognize(&mut self) -> Result<Option<String>> {
        Ok(self.0.pop_front().flatten())
    }
}

/// Hands out scripted lines and remembers the prompts it was shown
///
/// Running out of lines is end of input.
pub struct ScriptedKeyboard {
    lines: VecDeque<Result<String>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedKeyboard {
    pub fn new(lines: &[&str]) -> Self {
        Self::with_results(lines.iter().map(|line| Ok(line.to_string())).collect())
    }

    pub fn with_results(lines: Vec<Result<String>>) -> Self {
        Self {
            lines: lines.into(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl TextInput for ScriptedKeyboard {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.lines.pop_front().unwrap_or(Err(SaysoError::InputClosed))
    }
}

pub struct FakeWeather {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub result: std::result::Result<WeatherReport, WeatherError>,
}

impl WeatherService for FakeWeather {
    fn current(&self, city: &str) -> std::result::Result<WeatherReport, WeatherError> {
        self.calls.lock().push(city.to_string());
        self.result.clone()
    }
}

pub struct FakeEncyclopedia {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub result: std::result::Result<String, LookupError>,
}

impl EncyclopediaService for FakeEncyclopedia {
    fn summary(&self, query: &str) -> std::result::Result<String, LookupError> {
        self.calls.lock().push(query.to_string());
        self.result.clone()
    }
}

pub struct FakeMail {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
    pub result: std::result::Result<(), MailError>,
}

impl MailService for FakeMail {
    fn send(&self, mail: &OutgoingMail) -> std::result::Result<(), MailError> {
        self.sent.lock().push(mail.clone());
        self.result.clone()
    }
}

/// What the fake services answer
pub struct Answers {
    pub weather: std::result::Result<WeatherReport, WeatherError>,
    pub lookup: std::result::Result<String, LookupError>,
    pub mail: std::result::Result<(), MailError>,
}

impl Default for Answers {
    fn default() -> Self {
        Self {
            weather: Ok(WeatherReport {
                temperature: 21.4,
                description: "clear sky".to_string(),
            }),
            lookup: Ok("Photosynthesis is a process. It uses light.".to_string()),
            mail: Ok(()),
        }
    }
}

/// Fake services plus handles on what they were asked
pub struct FakeServices {
    pub weather_calls: Arc<Mutex<Vec<String>>>,
    pub lookups: Arc<Mutex<Vec<String>>>,
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl FakeServices {
    pub fn build(answers: Answers) -> (Services, Self) {
        let fakes = Self {
            weather_calls: Arc::default(),
            lookups: Arc::default(),
            sent: Arc::default(),
        };

        let services = Services {
            weather: Box::new(FakeWeather {
                calls: Arc::clone(&fakes.weather_calls),
                result: answers.weather,
            }),
            encyclopedia: Box::new(FakeEncyclopedia {
                calls: Arc::clone(&fakes.lookups),
                result: answers.lookup,
            }),
            mail: Box::new(FakeMail {
                sent: Arc::clone(&fakes.sent),
                result: answers.mail,
            }),
        };

        (services, fakes)
    }
}

/// A dispatcher wired to fakes, with its command file in a temp dir
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub responder: Arc<RecordingResponder>,
    pub fakes: FakeServices,
    pub store_path: PathBuf,
    _dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_answers(Answers::default())
    }

    pub fn with_answers(answers: Answers) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("custom_commands.json");
        let responder = RecordingResponder::new();
        let (services, fakes) = FakeServices::build(answers);

        let reminders =
            ReminderScheduler::new(responder.clone()).with_minute(Duration::from_millis(5));
        let dispatcher = Dispatcher::new(
            CommandStore::open(&store_path),
            responder.clone(),
            services,
            reminders,
            "Chennai",
        );

        Self {
            dispatcher,
            responder,
            fakes,
            store_path,
            _dir: dir,
        }
    }

    pub fn store(&self) -> &CommandStore {
        self.dispatcher.store()
    }

    /// Dispatch `utterance`, answering follow-up questions from `answers`
    ///
    /// Answers are typed, so nothing but the dispatcher's own words shows up
    /// in the transcript.
    pub fn dispatch(&self, utterance: &str, answers: &[&str]) -> Result<Outcome> {
        let mut listener = Listener::new(
            None,
            Box::new(ScriptedKeyboard::new(answers)),
            self.responder.clone(),
        );
        self.dispatcher.dispatch(utterance, &mut listener)
    }
}
