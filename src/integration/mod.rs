//! Wiring the assistant together
//!
//! Configuration loading and the main listen → dispatch loop.

pub mod assistant;
pub mod config;

pub use assistant::{install_interrupt_handler, Assistant, AssistantBuilder};
pub use config::{AssistantConfig, ConfigError};
