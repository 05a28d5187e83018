// ── Query/cache layer ──
//
// Keyed, time-bounded cache over the resource services with in-flight
// deduplication, stale-while-revalidate, retry, and prefix invalidation.

mod client;
mod key;
mod retry;

pub use client::{QueryClient, QueryConfig, StaleTimes};
pub use key::{QueryKey, keys};
pub use retry::{RetryPolicy, retry};
