pub mod board;
pub mod message;
