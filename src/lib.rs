pub mod banner;
pub mod commands;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod events;
pub mod job;
pub mod logging;
pub mod protocol;
pub mod runner;
