pub mod driver;
pub mod surface;
