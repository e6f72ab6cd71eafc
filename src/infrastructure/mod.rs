pub mod connectivity;
pub mod database;
pub mod events;
pub mod storage;
