//! One-shot delayed reminders
//!
//! Every reminder gets its own detached thread that sleeps until the fire
//! time and then speaks. Nothing is persisted and there is no cancellation;
//! a restart drops pending reminders.

use crate::speech::Responder;
use crate::{Result, SaysoError};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// A reminder waiting to fire
#[derive(Debug, Clone)]
pub struct PendingReminder {
    pub id: Uuid,
    pub message: String,
    pub fire_at: DateTime<Local>,
}

#[derive(Clone)]
pub struct ReminderScheduler {
    responder: Arc<dyn Responder>,
    /// Real length of one reminder minute
    minute: Duration,
}

impl ReminderScheduler {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            minute: Duration::from_secs(60),
        }
    }

    /// Use a different length for one minute
    pub fn with_minute(mut self, minute: Duration) -> Self {
        self.minute = minute;
        self
    }

    /// Wait before a reminder `minutes` from now fires; never negative
    pub fn delay_for(&self, minutes: i64) -> Duration {
        let minutes = u32::try_from(minutes.max(0)).unwrap_or(u32::MAX);
        self.minute.saturating_mul(minutes)
    }

    /// Fire "Reminder: <message>" after `minutes`, without blocking the caller
    pub fn schedule(&self, message: &str, minutes: i64) -> Result<PendingReminder> {
        let delay = self.delay_for(minutes);
        let fire_at = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|offset| Local::now().checked_add_signed(offset))
            .unwrap_or_else(Local::now);

        let reminder = PendingReminder {
            id: Uuid::new_v4(),
            message: message.to_string(),
            fire_at,
        };

        let responder = Arc::clone(&self.responder);
        let text = format!("Reminder: {}", reminder.message);
        let id = reminder.id;

        thread::Builder::new()
            .name(format!("reminder-{}", id))
            .spawn(move || {
                thread::sleep(delay);
                debug!("Reminder {} firing", id);
                responder.say(&text);
            })
            .map_err(|e| SaysoError::SchedulerError(format!("Failed to start reminder thread: {}", e)))?;

        info!(
            "Reminder {} scheduled for {}",
            reminder.id,
            reminder.fire_at.format("%H:%M:%S")
        );
        Ok(reminder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Sender};
    use parking_lot::Mutex;
    use std::time::Instant;

    struct ChannelResponder(Mutex<Sender<String>>);

    impl Responder for ChannelResponder {
        fn say(&self, text: &str) {
            let _ = self.0.lock().send(text.to_string());
        }
    }

    struct PanickingResponder;

    impl Responder for PanickingResponder {
        fn say(&self, _text: &str) {
            panic!("speaker exploded");
        }
    }

    #[test]
    fn test_delay_is_clamped() {
        let scheduler = ReminderScheduler::new(Arc::new(PanickingResponder));

        assert_eq!(scheduler.delay_for(-5), Duration::ZERO);
        assert_eq!(scheduler.delay_for(0), Duration::ZERO);
        assert_eq!(scheduler.delay_for(2), Duration::from_secs(120));
        assert!(scheduler.delay_for(i64::MAX) > Duration::from_secs(60 * 60 * 24 * 365));
    }

    #[test]
    fn test_negative_minutes_fire_immediately() {
        let (tx, rx) = unbounded();
        let scheduler = ReminderScheduler::new(Arc::new(ChannelResponder(Mutex::new(tx))));

        let started = Instant::now();
        let reminder = scheduler.schedule("stretch", -5).unwrap();
        assert!(reminder.fire_at <= Local::now());

        let spoken = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(spoken, "Reminder: stretch");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_schedule_does_not_block() {
        let (tx, rx) = unbounded();
        let scheduler = ReminderScheduler::new(Arc::new(ChannelResponder(Mutex::new(tx))))
            .with_minute(Duration::from_millis(200));

        let started = Instant::now();
        scheduler.schedule("tea", 1).unwrap();
        assert!(started.elapsed() < Duration::from_millis(150));

        assert!(rx.try_recv().is_err());
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            "Reminder: tea"
        );
    }

    #[test]
    fn test_reminders_are_independent() {
        let (tx, rx) = unbounded();
        let scheduler = ReminderScheduler::new(Arc::new(ChannelResponder(Mutex::new(tx))))
            .with_minute(Duration::from_millis(10));

        for i in 0..5 {
            scheduler.schedule(&format!("task {}", i), i % 3).unwrap();
        }

        let mut fired: Vec<String> = (0..5)
            .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap())
            .collect();
        fired.sort();
        assert_eq!(fired[0], "Reminder: task 0");
        assert_eq!(fired[4], "Reminder: task 4");
    }

    #[test]
    fn test_panicking_reminder_is_isolated() {
        let scheduler = ReminderScheduler::new(Arc::new(PanickingResponder));
        scheduler.schedule("boom", 0).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        // Still here: the panic stayed on the reminder thread
        assert!(scheduler.schedule("again", 0).is_ok());
    }
}
