pub mod config;
pub mod init;
pub mod item;
pub mod jobs;
pub mod workflow;
