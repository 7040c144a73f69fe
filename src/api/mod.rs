pub mod henrik;
pub mod tracker;
pub mod upstream;
