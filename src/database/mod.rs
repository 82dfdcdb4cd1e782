pub mod manager;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod seed;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use record::{Record, RecordError};
pub use store::{Criteria, Store, StoreError};
