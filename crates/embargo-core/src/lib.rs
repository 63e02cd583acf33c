pub mod config;
pub mod embargo;
pub mod engine;
pub mod error;
pub mod gate;
pub mod intent;
pub mod io;
pub mod item;
pub mod jobs;
pub mod paths;
pub mod record;
pub mod timing;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use error::{EmbargoError, Result};
