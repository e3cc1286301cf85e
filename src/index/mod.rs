pub mod catalog;
pub mod video_index;

pub use catalog::{Catalog, LoadOutcome};
pub use video_index::VideoIndex;
