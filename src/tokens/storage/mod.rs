// Storage module: SQLite persistence for token records
//
// `operations` holds the synchronous SQL, `database` wraps it in the async
// `TokenStore` contract.

pub mod database;
pub mod operations;
pub mod schema;

pub use database::SqliteTokenStore;
