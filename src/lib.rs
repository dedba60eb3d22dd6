pub mod config;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use config::SchedConfig;
pub use scheduler::Scheduler;
pub use sim::{RunSummary, Sim};
