pub mod cache;
pub mod error;
pub mod feed;
pub mod types;

pub use cache::FeedCache;
pub use error::{Error, Result};
pub use feed::{render_timestamp, RSS_CONTENT_TYPE};
pub use types::{CanonicalFeed, CanonicalRecord, RawRecord};
