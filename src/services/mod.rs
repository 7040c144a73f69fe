pub mod commands;
pub mod cooldown;
pub mod normalizer;
pub mod presenter;
pub mod stats_service;
