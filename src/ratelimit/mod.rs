//! Sliding-window rate limiting.

mod clock;
mod decision;
mod identifier;
mod limiter;
mod policy;
mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use decision::Decision;
pub use identifier::Identifier;
pub use limiter::RateLimiter;
pub use policy::RateLimitPolicy;
pub use record::RateRecord;
