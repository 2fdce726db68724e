pub mod config;
pub mod logging;

pub mod cache;
pub mod control;
pub mod events;
pub mod fetch;
pub mod job;
pub mod ledger;
pub mod queue;
pub mod scheduler;
