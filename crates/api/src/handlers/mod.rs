//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod cattle;
pub mod health;
pub mod notification;
pub mod organization;
pub mod pregnancy;
pub mod semination;
