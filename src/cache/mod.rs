//! Response caching and invalidation.
//!
//! Rendered pages are cached per path and served until the revalidation
//! interval elapses or the path is explicitly invalidated through the
//! revalidation endpoint. The mapping from changed documents to stale paths
//! lives in [`paths`].

mod lock;
pub mod middleware;
pub mod paths;
pub mod store;

pub use middleware::{CacheState, response_cache_layer};
pub use paths::paths_for;
pub use store::{CachedEntry, ResponseCache};
