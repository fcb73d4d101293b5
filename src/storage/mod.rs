//! Storage implementations for different backends

pub mod fs;
pub mod in_memory;

pub use fs::FsArtifactSink;
pub use in_memory::{
    InMemoryArtifactSink, InMemoryRecordSource, InMemoryReportHistoryStore, InMemorySortStateStore,
};
