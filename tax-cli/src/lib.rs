pub mod app;
pub mod commands;
pub mod config;
pub mod format;
pub mod input;
pub mod interactive;
pub mod logging;
