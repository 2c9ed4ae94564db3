pub mod carousel;
pub mod scroll;
