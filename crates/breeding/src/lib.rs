//! Breeding lifecycle engine and reminder scheduling.
//!
//! This crate owns the two moving parts of the herd's reproductive
//! workflow:
//!
//! - [`LifecycleEngine`] -- validates and applies lifecycle events
//!   (semination, pregnancy check, delivery, separation) as single
//!   database transactions.
//! - [`ReminderScheduler`] -- periodic sweeps that find records past a
//!   date threshold and emit reminders through a [`NotificationSink`].
//!
//! The pure rules (status machine, date arithmetic, effect planning) live
//! in `herdbook_core::breeding`; everything here is their transactional
//! application.

pub mod engine;
pub mod notify;
pub mod scheduler;

pub use engine::{DeliveryOutcome, EngineError, LifecycleEngine};
pub use notify::{LogSink, NotificationSink, PushDelivery};
pub use scheduler::ReminderScheduler;
