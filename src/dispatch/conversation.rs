//! Multi-turn slot filling for a single intent

use crate::speech::{Listener, Responder};
use crate::Result;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A value a multi-turn intent asks the user for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    City,
    Recipient,
    Subject,
    Body,
    ReminderText,
    ReminderMinutes,
    Query,
    Trigger,
    Response,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::City => "city",
            Slot::Recipient => "recipient",
            Slot::Subject => "subject",
            Slot::Body => "body",
            Slot::ReminderText => "reminder text",
            Slot::ReminderMinutes => "reminder minutes",
            Slot::Query => "query",
            Slot::Trigger => "trigger",
            Slot::Response => "response",
        };
        f.write_str(name)
    }
}

/// Questions and answers for one intent
///
/// Lives only as long as the intent handler. Each `ask` speaks one prompt
/// and takes exactly one answer; empty answers are not recorded, so a filled
/// slot always holds something the user actually said.
pub struct Conversation<'a> {
    listener: &'a mut Listener,
    responder: &'a dyn Responder,
    answers: BTreeMap<Slot, String>,
}

impl<'a> Conversation<'a> {
    pub fn new(listener: &'a mut Listener, responder: &'a dyn Responder) -> Self {
        Self {
            listener,
            responder,
            answers: BTreeMap::new(),
        }
    }

    /// Speak `prompt`, then listen once; true if the slot got filled
    pub fn ask(&mut self, slot: Slot, prompt: &str) -> Result<bool> {
        self.responder.say(prompt);
        let answer = self.listener.listen()?;
        Ok(self.record(slot, answer))
    }

    /// Speak `prompt`, then read one typed line shown with `input_prompt`
    ///
    /// For values recognizers get wrong, like email addresses. Case is kept.
    pub fn ask_typed(&mut self, slot: Slot, prompt: &str, input_prompt: &str) -> Result<bool> {
        self.responder.say(prompt);
        let answer = self.listener.read_text(input_prompt)?;
        Ok(self.record(slot, answer))
    }

    pub fn answer(&self, slot: Slot) -> Option<&str> {
        self.answers.get(&slot).map(String::as_str)
    }

    /// Move an answer out; an unfilled slot gives an empty string
    pub fn take(&mut self, slot: Slot) -> String {
        self.answers.remove(&slot).unwrap_or_default()
    }

    pub fn say(&self, text: &str) {
        self.responder.say(text);
    }

    fn record(&mut self, slot: Slot, answer: String) -> bool {
        if answer.is_empty() {
            debug!("{} left empty", slot);
            return false;
        }
        debug!("{} = '{}'", slot, answer);
        self.answers.insert(slot, answer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::TextInput;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Default)]
    struct Transcript(Mutex<Vec<String>>);

    impl Responder for Transcript {
        fn say(&self, text: &str) {
            self.0.lock().push(text.to_string());
        }
    }

    struct Typed(VecDeque<&'static str>);

    impl TextInput for Typed {
        fn read_line(&mut self, _prompt: &str) -> Result<String> {
            self.0.pop_front().map(str::to_string).ok_or(crate::SaysoError::InputClosed)
        }
    }

    #[test]
    fn test_ask_records_answers() {
        let transcript = Arc::new(Transcript::default());
        let mut listener = Listener::new(
            None,
            Box::new(Typed(VecDeque::from(["  Bob@Example.com ", "Lunch Plans.", "  "]))),
            transcript.clone(),
        );
        let mut conversation = Conversation::new(&mut listener, transcript.as_ref());

        assert!(conversation
            .ask_typed(Slot::Recipient, "Who is the recipient?", "Enter email: ")
            .unwrap());
        assert!(conversation.ask(Slot::Subject, "What's the subject?").unwrap());
        assert!(!conversation.ask(Slot::Body, "And the body?").unwrap());

        assert_eq!(conversation.answer(Slot::Recipient), Some("Bob@Example.com"));
        assert_eq!(conversation.answer(Slot::Body), None);
        assert_eq!(conversation.take(Slot::Subject), "lunch plans");
        assert_eq!(conversation.answer(Slot::Subject), None);
        assert_eq!(conversation.take(Slot::Body), "");
        assert_eq!(
            *transcript.0.lock(),
            vec!["Who is the recipient?", "What's the subject?", "And the body?"]
        );
    }

    #[test]
    fn test_closed_input_propagates() {
        let transcript = Arc::new(Transcript::default());
        let mut listener = Listener::new(None, Box::new(Typed(VecDeque::new())), transcript.clone());
        let mut conversation = Conversation::new(&mut listener, transcript.as_ref());

        assert!(matches!(
            conversation.ask(Slot::City, "Which city?"),
            Err(crate::SaysoError::InputClosed)
        ));
    }
}
