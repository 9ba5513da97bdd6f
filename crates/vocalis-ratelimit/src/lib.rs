// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request rate limiting for the voice agent.
//!
//! Each identifier (usually a client IP) gets two request-triggered
//! windows, one minute and one hour long. Exceeding the minute cap
//! installs a block; exceeding the hour cap only rejects.
//!
//! State lives in a [`KvStore`](vocalis_core::KvStore) and is updated by
//! plain read-modify-write. Concurrent checks for one identifier can lose
//! increments; limits are approximate under contention.

pub mod limiter;
pub mod policy;

pub use limiter::{
    RateLimitEntry, RateLimitResult, RateLimitStats, RateLimitStatus, RateLimiter, WindowStatus,
};
pub use policy::{RateLimitPolicy, Window};
