pub mod app;
pub mod config;
pub mod cue_controller;
pub mod match_manager;
pub mod report;
pub mod sync_commands;
pub mod workout;
