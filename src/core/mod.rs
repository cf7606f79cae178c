pub mod error;
pub mod poll;
pub mod status;
pub mod train;
