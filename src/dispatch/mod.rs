//! Intent matching and execution
//!
//! This module provides:
//! - `Intent::classify`: ordered keyword rules plus custom command lookup
//! - `Conversation`: follow-up questions for multi-turn intents
//! - `Dispatcher`: runs one utterance and speaks the result

pub mod conversation;
pub mod dispatcher;
pub mod intent;
pub mod parse;

pub use conversation::{Conversation, Slot};
pub use dispatcher::{Dispatcher, Outcome, HELP_TEXT, UNKNOWN_TEXT};
pub use intent::{extract_city, strip_lookup_prefix, Intent};
pub use parse::{format_date, format_time, parse_minutes, parse_number_words};
