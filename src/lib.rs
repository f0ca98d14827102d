pub mod analysis;
pub mod audit;
pub mod config;
pub mod errors;
pub mod generator;
pub mod mutation;
pub mod scan;
pub mod source;
pub mod telemetry;
pub mod ui;
pub mod uiforge_config;
pub mod util;
pub mod verify;
pub mod workflow;
