//! Donation Guard - rate limiting for public donation submission
//!
//! This crate implements the sliding-window rate limiter that guards public
//! donation forms, the dual-key (client IP + donor phone) submission check
//! built on it, and the submission workflow and abuse report around it. The
//! limiter works over any key/value store offering get and full-replace put,
//! and fails open when that store is unavailable.

pub mod config;
pub mod donation;
pub mod error;
pub mod grpc;
pub mod ratelimit;
pub mod store;
