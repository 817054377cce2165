pub mod apis;
pub mod arguments;
pub mod config;
pub mod errors;
pub mod logger;
pub mod sync;
pub mod tokens;
