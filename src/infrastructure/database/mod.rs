pub mod connection_pool;
pub mod sqlite_repository;

pub use connection_pool::ConnectionPool;
pub use sqlite_repository::SqliteInspectionRepository;
