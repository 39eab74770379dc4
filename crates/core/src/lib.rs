//! Pure domain logic for the herdbook platform.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the lifecycle engine, the reminder scheduler, and any
//! future CLI tooling alike. It owns:
//!
//! - [`types`] -- shared id and timestamp aliases
//! - [`error`] -- the domain error taxonomy
//! - [`roles`] -- actor roles and the tenant/assignment access rules
//! - [`breeding`] -- the breeding lifecycle state machine and date arithmetic

pub mod breeding;
pub mod error;
pub mod roles;
pub mod types;
