/*!
 * Dictionary lookups with caching and rate limiting.
 *
 * - `session`: in-memory first tier
 * - `remote`: HTTP client for the word search service
 * - `cache`: tier composition (session, persistent store, remote)
 * - `queue`: sequential, rate-limited resolution of a word list
 */

pub mod cache;
pub mod queue;
pub mod remote;
pub mod session;

pub use cache::{DictionaryCache, MeaningStore};
pub use queue::{FixedDelay, LookupEvent, LookupOutcome, LookupQueue, RateLimit, RateLimitPolicy, TokenBucket};
pub use remote::{JishoClient, MeaningService};
pub use session::{SessionCache, SessionStats};
