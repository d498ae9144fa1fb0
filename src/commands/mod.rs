pub mod store;

pub use store::{normalize_trigger, CommandStore, UpsertOutcome};
