//! Carga de configuración desde variables de entorno.
//! Usa convención `DATABASE_URL` y parámetros opcionales de pool; el
//! almacenamiento de objetos se configura con `SABERES_STORAGE_DIR` y
//! `SABERES_PUBLIC_URL`.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::error::PersistenceError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, PersistenceError> {
        init_dotenv();
        let url = env::var("DATABASE_URL").map_err(|_| PersistenceError::Config("DATABASE_URL no definido".into()))?;
        let min_connections = parse_var("DATABASE_MIN_CONNECTIONS").unwrap_or(2);
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS").unwrap_or(16);
        Ok(Self { url,
                  min_connections,
                  max_connections })
    }
}

/// Directorio raíz de los objetos y base de sus URLs públicas.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub public_base: String,
}

impl StorageConfig {
    pub const DEFAULT_ROOT: &'static str = "./storage";
    pub const DEFAULT_PUBLIC_BASE: &'static str = "http://localhost:8080/storage";

    pub fn from_env() -> Self {
        init_dotenv();
        let root = env::var("SABERES_STORAGE_DIR").map(PathBuf::from)
                                                  .unwrap_or_else(|_| PathBuf::from(Self::DEFAULT_ROOT));
        let public_base = env::var("SABERES_PUBLIC_URL").unwrap_or_else(|_| Self::DEFAULT_PUBLIC_BASE.to_string());
        Self { root, public_base }
    }
}

fn parse_var(name: &str) -> Option<u32> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
