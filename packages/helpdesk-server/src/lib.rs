// HTTP front end for the help desk pipeline
pub mod config;
pub mod server;

pub use config::Config;
