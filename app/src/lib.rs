pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod live_status;
pub mod logging;
pub mod reconcile;
pub mod services;
pub mod setup;
pub mod streamers;

pub use bootstrap::{Foundation, build_loop, data_dir, init_foundation};
