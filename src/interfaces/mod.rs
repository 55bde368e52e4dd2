pub mod metadata_source;
pub mod snapshot_publisher;
