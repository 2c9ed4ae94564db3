pub mod decode;
pub mod frames;
