pub mod limiter;

pub use limiter::{RateLimitConfig, RateLimiter};
