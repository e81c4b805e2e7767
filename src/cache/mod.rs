mod diff_cache;

pub use diff_cache::{content_hash, DiffCache, DiffOutcome, EVICT_KEEP_RATIO, MAX_ENTRIES};
