pub mod snapshot;

pub use snapshot::{SnapshotDocument, SnapshotStore};
