//! Cache and API data types.

mod record;
mod snapshot;

pub use record::{DomainRecord, HostEntry};
pub use snapshot::{CacheSnapshot, SNAPSHOT_KEY};
