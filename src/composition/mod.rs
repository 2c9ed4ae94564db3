pub mod config;
pub mod dsl;
pub mod model;
