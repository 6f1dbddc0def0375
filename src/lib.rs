pub mod cli;
pub mod config;
pub mod decoder;
pub mod flight_state;
pub mod geofence;
pub mod ingestor;
pub mod logging;
pub mod recorder;
pub mod report;
pub mod resolver;
pub mod thread_manager;
pub mod tracker;
pub mod types;
