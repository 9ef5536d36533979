pub mod location;
pub mod object_store;

pub use location::{Location, LocationError};
pub use object_store::{ObjectStore, S3ObjectStore, StorageError};
