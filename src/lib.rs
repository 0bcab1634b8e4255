pub mod cli;
pub mod commands;
pub mod config;
pub mod graph;
pub mod models;
pub mod store;
