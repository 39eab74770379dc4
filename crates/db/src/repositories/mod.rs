//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-statement lifecycle
//! transactions live in the `herdbook-breeding` engine, not here.

pub mod cattle_repo;
pub mod notification_repo;
pub mod organization_repo;
pub mod pregnancy_repo;
pub mod semination_repo;
pub mod user_repo;

pub use cattle_repo::CattleRepo;
pub use notification_repo::NotificationRepo;
pub use organization_repo::OrganizationRepo;
pub use pregnancy_repo::PregnancyRepo;
pub use semination_repo::SeminationRepo;
pub use user_repo::UserRepo;
