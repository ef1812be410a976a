pub mod verification_models;
