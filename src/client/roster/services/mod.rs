pub mod roster_services;
