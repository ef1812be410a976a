pub mod config;
pub mod credentials;
pub mod marker_store;
