pub mod api_client;
pub mod auth;
pub mod roster;
pub mod verification;

pub use api_client::{ApiClient, AttendanceBackend};
pub use auth::{AuthProvider, StaticToken};
