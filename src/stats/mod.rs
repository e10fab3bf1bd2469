//! Rate-limited, cached client for the football-data.org API.
//!
//! The free tier allows ten requests per minute across the whole account,
//! so every outbound call is serialized through a single interval gate and
//! memoized per query parameter. Layering, bottom up:
//!
//! | Layer | Module | Responsibility |
//! |-------|--------|----------------|
//! | Interval gate | [`limiter`] | global minimum spacing between requests |
//! | Response cache | [`cache`] | TTL + LRU memoization per query key |
//! | Typed envelope | [`types`] | tolerant deserialization + filters |
//! | Client | [`client`] | endpoints, auth, error taxonomy |
//!
//! There is deliberately no retry-with-backoff here: a 429 surfaces as a
//! distinguished [`StatsError::RateLimited`] and the caller skips or aborts,
//! never hammers the quota.

pub mod cache;
pub mod client;
pub mod limiter;
pub mod types;

pub use cache::ResponseCache;
pub use client::{StatsApi, StatsClient, StatsError};
pub use limiter::IntervalGate;
pub use types::{
    ScorerRecord, SquadMember, StatsEnvelope, scorers_of_nationality, squad_of_nationality,
};
