use std::collections::HashMap;

use chrono::Utc;
use indexmap::IndexMap;
use saberes_domain::{NewSpace, Space};
use uuid::Uuid;

use super::{GatewayError, PublicUrl, SpaceOrder};
use crate::constants::MEDIA_BUCKET;
use crate::fragment::DraftRecord;

/// Gateway de persistencia de espacios.
///
/// Se inyecta en el asistente y en el directorio; nunca es un singleton
/// global. Las operaciones son síncronas: el llamador decide en qué hilo o
/// tarea ejecutarlas.
pub trait PersistenceGateway {
    /// Inserta un registro nuevo y devuelve el registro persistido (con `id`
    /// y timestamps asignados).
    fn insert(&mut self, record: NewSpace) -> Result<Space, GatewayError>;
    /// Aplica `patch` (merge shallow por campo) sobre el registro `id`.
    fn update(&mut self, id: Uuid, patch: &DraftRecord) -> Result<Space, GatewayError>;
    fn delete(&mut self, id: Uuid) -> Result<(), GatewayError>;
    fn select_by_id(&self, id: Uuid) -> Result<Option<Space>, GatewayError>;
    fn select_all(&self, order: SpaceOrder) -> Result<Vec<Space>, GatewayError>;
}

/// Almacenamiento de objetos (medios de un espacio).
pub trait ObjectStorage {
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<PublicUrl, GatewayError>;
    fn remove(&mut self, path: &str) -> Result<(), GatewayError>;
    fn public_url(&self, path: &str) -> PublicUrl;

    /// Recupera la ruta del objeto a partir de su URL pública: todo lo que
    /// sigue al primer segmento `/spaces/`.
    fn path_from_url(&self, url: &str) -> Option<String> {
        let marker = format!("/{MEDIA_BUCKET}/");
        let start = url.find(&marker)? + marker.len();
        let path = &url[start..];
        (!path.is_empty()).then(|| path.to_string())
    }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn insert(&mut self, record: NewSpace) -> Result<Space, GatewayError> {
        (**self).insert(record)
    }
    fn update(&mut self, id: Uuid, patch: &DraftRecord) -> Result<Space, GatewayError> {
        (**self).update(id, patch)
    }
    fn delete(&mut self, id: Uuid) -> Result<(), GatewayError> {
        (**self).delete(id)
    }
    fn select_by_id(&self, id: Uuid) -> Result<Option<Space>, GatewayError> {
        (**self).select_by_id(id)
    }
    fn select_all(&self, order: SpaceOrder) -> Result<Vec<Space>, GatewayError> {
        (**self).select_all(order)
    }
}

/// Gateway en memoria; conserva el orden de inserción para desempatar
/// timestamps iguales.
#[derive(Debug, Default)]
pub struct InMemorySpaceGateway {
    pub inner: IndexMap<Uuid, Space>,
}

impl InMemorySpaceGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceGateway for InMemorySpaceGateway {
    fn insert(&mut self, record: NewSpace) -> Result<Space, GatewayError> {
        let now = Utc::now();
        let space = Space { id: Uuid::new_v4(),
                            user_id: record.user_id,
                            fields: record.fields,
                            review_count: Some(0),
                            kind: None,
                            website: None,
                            created_at: now,
                            updated_at: now };
        self.inner.insert(space.id, space.clone());
        Ok(space)
    }

    fn update(&mut self, id: Uuid, patch: &DraftRecord) -> Result<Space, GatewayError> {
        let space = self.inner
                        .get_mut(&id)
                        .ok_or_else(|| GatewayError::new(format!("space not found: {id}")))?;
        let mut fields = space.fields.clone();
        patch.apply_to(&mut fields).map_err(|e| GatewayError::new(e.to_string()))?;
        space.fields = fields;
        space.updated_at = Utc::now();
        Ok(space.clone())
    }

    fn delete(&mut self, id: Uuid) -> Result<(), GatewayError> {
        self.inner.shift_remove(&id);
        Ok(())
    }

    fn select_by_id(&self, id: Uuid) -> Result<Option<Space>, GatewayError> {
        Ok(self.inner.get(&id).cloned())
    }

    fn select_all(&self, order: SpaceOrder) -> Result<Vec<Space>, GatewayError> {
        let mut all: Vec<Space> = self.inner.values().cloned().collect();
        match order {
            SpaceOrder::CreatedAtAsc => all.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SpaceOrder::CreatedAtDesc => {
                all.reverse();
                all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            SpaceOrder::NameAsc => all.sort_by(|a, b| a.fields.name.cmp(&b.fields.name)),
        }
        Ok(all)
    }
}

/// Almacenamiento de objetos en memoria.
#[derive(Debug)]
pub struct InMemoryObjectStorage {
    pub objects: HashMap<String, Vec<u8>>,
    pub base_url: String,
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { objects: HashMap::new(),
               base_url: base_url.into() }
    }
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new("memory://storage")
    }
}

impl ObjectStorage for InMemoryObjectStorage {
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<PublicUrl, GatewayError> {
        if self.objects.contains_key(path) {
            return Err(GatewayError::new(format!("The resource already exists: {path}")));
        }
        self.objects.insert(path.to_string(), bytes.to_vec());
        Ok(self.public_url(path))
    }

    fn remove(&mut self, path: &str) -> Result<(), GatewayError> {
        self.objects.remove(path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> PublicUrl {
        format!("{}/{MEDIA_BUCKET}/{path}", self.base_url.trim_end_matches('/'))
    }
}
