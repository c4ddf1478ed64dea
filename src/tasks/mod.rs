//! Background Tasks Module
//!
//! # Tasks
//! - TTL Sweep: purges expired cache entries at a configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
