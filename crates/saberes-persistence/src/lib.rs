//! saberes-persistence
//!
//! Implementación Postgres (Diesel + r2d2) del `PersistenceGateway` del core,
//! almacenamiento de objetos en disco y utilidades de conexión y
//! migraciones.
//!
//! Módulos:
//! - `pg`: gateway de espacios sobre Postgres.
//! - `storage`: `ObjectStorage` sobre un directorio local.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;
pub mod storage;

pub use config::{init_dotenv, DbConfig, StorageConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, ConnectionProvider, PgPool, PgSpaceGateway, PoolProvider};
pub use storage::FsObjectStorage;
