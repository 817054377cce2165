//! Configuration system
//!
//! All structures live in [`schemas`] and are declared with
//! [`config_struct!`](crate::config_struct) so defaults sit next to the
//! field. The loaded configuration is kept in a global `OnceCell` and read
//! through [`with_config`] / [`get_config_clone`].

#[macro_use]
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{AthOracleConfig, Config, DatabaseConfig, PoolOracleConfig, SyncConfig};
pub use utils::{
    get_config_clone, load_config, load_config_from_path, read_config_file, with_config,
    CONFIG_FILE_PATH,
};
