pub mod cache;
pub mod message;
pub mod player;
pub mod stats;
