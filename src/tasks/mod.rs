//! Background Tasks Module
//!
//! Contains the tasks the cache schedules outside of callers' call stacks.
//!
//! # Tasks
//! - TTL Expiry: one timer per live record, removing it once its TTL elapses

mod expiry;

pub use expiry::ExpiryTimer;
