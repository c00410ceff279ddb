//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - TTL Expiration: Evicts cache entries as soon as their TTL elapses

mod expiration;

pub(crate) use expiration::spawn_expiration_task;
