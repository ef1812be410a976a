pub mod roster_models;
