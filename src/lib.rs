pub mod backend;
pub mod cli;
pub mod config;
pub mod history;
pub mod inference;
pub mod profile;
pub mod state;
pub mod store;
