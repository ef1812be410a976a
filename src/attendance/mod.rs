pub mod capture;
pub mod clock;
pub mod controller;
pub mod filter;
pub mod guard;
pub mod pipeline;
pub mod role;
pub mod status;
pub mod window;
