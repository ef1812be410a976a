pub mod verification_services;
