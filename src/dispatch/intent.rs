//! Classifying one utterance into an intent
//!
//! Rules are checked in a fixed priority order and the first match wins.
//! Most rules are plain substring tests, so overlapping words resolve by
//! order: "hello, what time is it" is a greeting, "stopwatch" is an exit.

use crate::commands::CommandStore;

const EXIT_WORDS: &[&str] = &["exit", "quit", "stop", "bye"];
const GREETING_WORDS: &[&str] = &["hello", "hi", "hey"];
const EMAIL_WORDS: &[&str] = &["send email", "email"];
const REMINDER_WORDS: &[&str] = &["remind me", "set reminder"];
const ADD_COMMAND_WORDS: &[&str] = &["add command", "create command"];
const HELP_WORDS: &[&str] = &["help", "commands"];

/// Lookup prefixes, tried in this order
pub const LOOKUP_PREFIXES: &[&str] = &["who is", "what is", "tell me about"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Nothing was said
    Empty,
    Exit,
    /// Exact match on a user-defined trigger
    Custom { response: String },
    Greeting,
    Time,
    Date,
    /// `city` is set when the utterance named one after " in "
    Weather { city: Option<String> },
    Email,
    Reminder,
    /// `query` is None when only the prefix was said
    Lookup { query: Option<String> },
    AddCommand,
    Help,
    Unknown,
}

impl Intent {
    pub fn classify(utterance: &str, store: &CommandStore) -> Self {
        if utterance.is_empty() {
            return Intent::Empty;
        }

        if contains_any(utterance, EXIT_WORDS) {
            return Intent::Exit;
        }

        if let Some(response) = store.get(utterance) {
            return Intent::Custom { response };
        }

        if contains_any(utterance, GREETING_WORDS) {
            return Intent::Greeting;
        }

        if utterance.contains("time") {
            return Intent::Time;
        }

        if utterance.contains("date") {
            return Intent::Date;
        }

        if utterance.contains("weather") {
            return Intent::Weather {
                city: extract_city(utterance),
            };
        }

        if contains_any(utterance, EMAIL_WORDS) {
            return Intent::Email;
        }

        if contains_any(utterance, REMINDER_WORDS) {
            return Intent::Reminder;
        }

        if let Some(remainder) = strip_lookup_prefix(utterance) {
            return Intent::Lookup {
                query: (!remainder.is_empty()).then(|| remainder.to_string()),
            };
        }

        if contains_any(utterance, ADD_COMMAND_WORDS) {
            return Intent::AddCommand;
        }

        if contains_any(utterance, HELP_WORDS) {
            return Intent::Help;
        }

        Intent::Unknown
    }
}

fn contains_any(utterance: &str, words: &[&str]) -> bool {
    words.iter().any(|word| utterance.contains(word))
}

/// The text after the first `" in "`, if any
pub fn extract_city(utterance: &str) -> Option<String> {
    utterance
        .split_once(" in ")
        .map(|(_, city)| city.trim())
        .filter(|city| !city.is_empty())
        .map(str::to_string)
}

/// Remove the first matching lookup prefix, once
///
/// Returns the trimmed remainder, or None when no prefix matches.
pub fn strip_lookup_prefix(utterance: &str) -> Option<&str> {
    LOOKUP_PREFIXES
        .iter()
        .find_map(|prefix| utterance.strip_prefix(prefix))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(pairs: &[(&str, &str)]) -> (CommandStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CommandStore::open(dir.path().join("commands.json"));
        for (trigger, response) in pairs {
            store.upsert(trigger, response);
        }
        (store, dir)
    }

    fn classify(utterance: &str) -> Intent {
        let (store, _dir) = store_with(&[]);
        Intent::classify(utterance, &store)
    }

    #[test]
    fn test_empty() {
        assert_eq!(classify(""), Intent::Empty);
    }

    #[test]
    fn test_exit_words() {
        for utterance in ["exit", "please quit now", "stop", "ok bye", "stopwatch"] {
            assert_eq!(classify(utterance), Intent::Exit, "{}", utterance);
        }
    }

    #[test]
    fn test_exit_beats_everything() {
        assert_eq!(classify("hello and bye"), Intent::Exit);

        let (store, _dir) = store_with(&[("goodbye world", "never spoken")]);
        assert_eq!(Intent::classify("goodbye world", &store), Intent::Exit);
    }

    #[test]
    fn test_custom_beats_builtins() {
        let (store, _dir) = store_with(&[("what time is it", "party time"), ("hello", "yo")]);

        assert_eq!(
            Intent::classify("what time is it", &store),
            Intent::Custom {
                response: "party time".to_string()
            }
        );
        assert_eq!(
            Intent::classify("hello", &store),
            Intent::Custom {
                response: "yo".to_string()
            }
        );
        // Exact match only
        assert_eq!(Intent::classify("hello there", &store), Intent::Greeting);
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(classify("hey what time is it"), Intent::Greeting);
        assert_eq!(classify("what is the date and time"), Intent::Time);
        assert_eq!(classify("weather update"), Intent::Date);
        assert_eq!(classify("email me the weather"), Intent::Weather { city: None });
        assert_eq!(classify("remind me to send email"), Intent::Email);
        assert_eq!(classify("what is a reminder command"), Intent::Lookup {
            query: Some("a reminder command".to_string())
        });
        assert_eq!(classify("add command for help"), Intent::AddCommand);
    }

    #[test]
    fn test_single_intents() {
        assert_eq!(classify("good morning"), Intent::Unknown);
        assert_eq!(classify("what's the time"), Intent::Time);
        assert_eq!(classify("today's date"), Intent::Date);
        assert_eq!(classify("send email"), Intent::Email);
        assert_eq!(classify("set reminder"), Intent::Reminder);
        assert_eq!(classify("create command"), Intent::AddCommand);
        assert_eq!(classify("list commands"), Intent::Help);
        assert_eq!(classify("help"), Intent::Help);
        assert_eq!(classify("play music"), Intent::Unknown);
    }

    #[test]
    fn test_weather_city() {
        assert_eq!(
            classify("weather in Paris"),
            Intent::Weather {
                city: Some("Paris".to_string())
            }
        );
        assert_eq!(
            classify("weather in new york"),
            Intent::Weather {
                city: Some("new york".to_string())
            }
        );
        assert_eq!(classify("weather"), Intent::Weather { city: None });
    }

    #[test]
    fn test_extract_city_splits_once() {
        assert_eq!(extract_city("weather in saint louis in missouri").as_deref(), Some("saint louis in missouri"));
        assert_eq!(extract_city("weather in   "), None);
        assert_eq!(extract_city("weather please"), None);
    }

    #[test]
    fn test_lookup_prefixes() {
        assert_eq!(
            classify("what is photosynthesis"),
            Intent::Lookup {
                query: Some("photosynthesis".to_string())
            }
        );
        assert_eq!(
            classify("tell me about rust"),
            Intent::Lookup {
                query: Some("rust".to_string())
            }
        );
        assert_eq!(classify("who is"), Intent::Lookup { query: None });
        // Prefix only, not anywhere in the sentence
        assert_eq!(classify("guess who is back"), Intent::Unknown);
    }

    #[test]
    fn test_strip_lookup_prefix_once() {
        assert_eq!(strip_lookup_prefix("what is what is"), Some("what is"));
        assert_eq!(strip_lookup_prefix("whatever"), None);
    }
}
