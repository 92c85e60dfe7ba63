pub mod feed;
pub mod item;
pub mod source;
pub mod validation;

pub use feed::{FeedType, SourceKind};
pub use item::{ContentStats, ExtractedItem};
pub use source::SourceDescriptor;
pub use validation::ValidationResult;
