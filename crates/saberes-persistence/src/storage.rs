//! Almacenamiento de objetos sobre un directorio local.
//!
//! Los objetos viven en `<root>/spaces/<path>` y se publican como
//! `<public_base>/spaces/<path>`. Subir sobre una ruta existente falla, como
//! en el bucket remoto sin `upsert`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use log::debug;
use saberes_core::constants::MEDIA_BUCKET;
use saberes_core::{GatewayError, ObjectStorage, PublicUrl};

use crate::config::StorageConfig;
use crate::error::PersistenceError;

#[derive(Debug, Clone)]
pub struct FsObjectStorage {
    root: PathBuf,
    public_base: String,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self { root: root.into(),
               public_base: public_base.into() }
    }

    pub fn from_config(cfg: &StorageConfig) -> Self {
        Self::new(cfg.root.clone(), cfg.public_base.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ruta en disco de `path`. Sólo se aceptan rutas relativas sin `..`.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, PersistenceError> {
        let relative = Path::new(path);
        let valid = !path.is_empty() && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(PersistenceError::Storage(format!("invalid object path: {path}")));
        }
        Ok(self.root.join(MEDIA_BUCKET).join(relative))
    }

    pub fn write_object(&self, path: &str, bytes: &[u8]) -> Result<PathBuf, PersistenceError> {
        let target = self.resolve(path)?;
        if target.exists() {
            return Err(PersistenceError::Storage(format!("The resource already exists: {path}")));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        debug!("objeto escrito en {}", target.display());
        Ok(target)
    }

    /// Borra `path`. Un objeto inexistente no es error.
    pub fn remove_object(&self, path: &str) -> Result<(), PersistenceError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ObjectStorage for FsObjectStorage {
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<PublicUrl, GatewayError> {
        self.write_object(path, bytes)?;
        Ok(self.public_url(path))
    }

    fn remove(&mut self, path: &str) -> Result<(), GatewayError> {
        Ok(self.remove_object(path)?)
    }

    fn public_url(&self, path: &str) -> PublicUrl {
        format!("{}/{MEDIA_BUCKET}/{path}", self.public_base.trim_end_matches('/'))
    }
}
