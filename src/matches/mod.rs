//! Match records: the canonical model, upstream normalization and search.
//!
//! - [`RawMatchRecord`] - upstream segment, object or unknown shape
//! - [`NormalizedMatch`] - canonical match used everywhere else
//! - [`normalize`] / [`normalize_all`] - two-tier decoding into the canonical shape
//! - [`filter_matches`] / [`sort_by_start`] - keyword search and ordering

mod filter;
mod model;
mod normalize;
mod timestamp;

pub use filter::{filter_matches, sort_by_start};
pub use model::{MatchScore, NormalizedMatch, RawMatchRecord, UNKNOWN_TEAM};
pub use normalize::{MATCH_PAGE_BASE, normalize, normalize_all};
pub use timestamp::{UPSTREAM_TIME_FORMAT, coerce_epoch_seconds, parse_naive_utc};
