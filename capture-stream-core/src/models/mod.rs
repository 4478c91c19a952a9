pub mod config;
pub mod constraints;
pub mod device;
pub mod error;
pub mod settings;
pub mod snapshot;
pub mod state;
