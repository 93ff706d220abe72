pub mod api;
pub mod builds;
pub mod cli;
pub mod commits;
pub mod input;
pub mod models;
pub mod ranking;
pub mod report;
pub mod requests;
pub mod services;
pub mod settings;
pub mod staleness;
pub mod threads;
