//! Publish/unpublish job queue.
//!
//! Provides `ScheduledJob`, `JobRef`, the `JobQueue` seam, an in-process
//! `MemoryJobQueue` and the redb-backed `JobDb`. Executing due jobs belongs
//! to whatever runner polls `JobQueue::due`.

pub mod db;
pub mod job;
pub mod queue;

pub use db::JobDb;
pub use job::{JobRef, ScheduledJob};
pub use queue::{JobQueue, MemoryJobQueue};
