//! Directorio de espacios: listado, búsqueda, borrado y resumen de tarjeta.

use saberes_domain::Space;
use serde::Serialize;
use uuid::Uuid;

use crate::constants::{MAPS_SEARCH_URL, SUMMARY_THEME_TAGS};
use crate::errors::CoreError;
use crate::gateway::{PersistenceGateway, SpaceOrder};
use crate::identity::Actor;

/// Operaciones de lectura y borrado sobre un gateway inyectado.
#[derive(Debug)]
pub struct Directory<G: PersistenceGateway> {
    gateway: G,
}

impl<G: PersistenceGateway> Directory<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Todos los espacios, más recientes primero.
    pub fn list(&self) -> Result<Vec<Space>, CoreError> {
        self.gateway.select_all(SpaceOrder::CreatedAtDesc).map_err(CoreError::persistence)
    }

    /// Listado filtrado por `query` (ver [`search`]).
    pub fn search(&self, query: &str) -> Result<Vec<Space>, CoreError> {
        Ok(search(self.list()?, query))
    }

    pub fn get(&self, id: Uuid) -> Result<Space, CoreError> {
        self.gateway.select_by_id(id).map_err(CoreError::persistence)?.ok_or(CoreError::NotFound(id))
    }

    /// Elimina `id`. Requiere actor con permiso de gestión.
    pub fn delete(&mut self, actor: Option<&Actor>, id: Uuid) -> Result<(), CoreError> {
        let actor = actor.ok_or(CoreError::Unauthenticated)?;
        if !actor.can_manage_spaces() {
            return Err(CoreError::Forbidden);
        }
        self.gateway.delete(id).map_err(|e| {
                                   log::error!("no se pudo eliminar el espacio {id}: {e}");
                                   CoreError::persistence(e)
                               })?;
        log::debug!("espacio {id} eliminado por {}", actor.id);
        Ok(())
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }
}

/// Coincidencia sin distinguir mayúsculas en nombre, descripción o
/// dirección. Una consulta en blanco devuelve todo.
pub fn search(spaces: Vec<Space>, query: &str) -> Vec<Space> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return spaces;
    }
    spaces.into_iter()
          .filter(|s| {
              [&s.fields.name, &s.fields.description, &s.fields.address].iter()
                                                                          .any(|t| t.to_lowercase().contains(&needle))
          })
          .collect()
}

/// Enlace de búsqueda en Google Maps; los espacios se reemplazan por `+`.
pub fn maps_link(address: &str) -> String {
    let query = address.split_whitespace().collect::<Vec<_>>().join("+");
    format!("{MAPS_SEARCH_URL}{query}")
}

/// Proyección de un espacio para las tarjetas del listado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceSummary {
    pub id: Uuid,
    pub name: String,
    pub rating_label: String,
    pub cover_url: Option<String>,
    pub theme_tags: Vec<String>,
    /// Etiquetas que no entran en la tarjeta.
    pub hidden_tags: usize,
}

impl SpaceSummary {
    pub fn from_space(space: &Space) -> Self {
        let fields = &space.fields;
        let rating_label = if fields.rating > 0 {
            format!("{:.1}", f64::from(fields.rating))
        } else {
            "N/A".to_string()
        };
        let shown = fields.theme_tags.len().min(SUMMARY_THEME_TAGS);
        Self { id: space.id,
               name: fields.name.clone(),
               rating_label,
               cover_url: fields.media_urls.first().cloned(),
               theme_tags: fields.theme_tags[..shown].to_vec(),
               hidden_tags: fields.theme_tags.len() - shown }
    }

    /// Texto `+N more` cuando hay etiquetas ocultas.
    pub fn more_label(&self) -> Option<String> {
        (self.hidden_tags > 0).then(|| format!("+{} more", self.hidden_tags))
    }
}

impl From<&Space> for SpaceSummary {
    fn from(space: &Space) -> Self {
        SpaceSummary::from_space(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemorySpaceGateway;
    use crate::identity::Role;
    use saberes_domain::{NewSpace, SpaceFields};

    fn seeded() -> (Directory<InMemorySpaceGateway>, Vec<Uuid>) {
        let mut gw = InMemorySpaceGateway::new();
        let mut ids = Vec::new();
        for (name, address) in [("Museu Nacional", "Rua A, Rio"), ("Planetário", "Av. B, Recife")] {
            let fields = SpaceFields { name: name.into(),
                                       address: address.into(),
                                       ..Default::default() };
            ids.push(gw.insert(NewSpace { user_id: Uuid::new_v4(), fields }).unwrap().id);
        }
        (Directory::new(gw), ids)
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_address() {
        let (dir, _) = seeded();
        assert_eq!(dir.search("museu").unwrap().len(), 1);
        assert_eq!(dir.search("RECIFE").unwrap()[0].fields.name, "Planetário");
        assert_eq!(dir.search("   ").unwrap().len(), 2);
    }

    #[test]
    fn delete_needs_capability() {
        let (mut dir, ids) = seeded();
        let visitor = Actor::new(Uuid::new_v4(), "v@x.org", Role::Visitor);
        assert_eq!(dir.delete(None, ids[0]), Err(CoreError::Unauthenticated));
        assert_eq!(dir.delete(Some(&visitor), ids[0]), Err(CoreError::Forbidden));
        let curator = Actor::new(Uuid::new_v4(), "c@x.org", Role::Curator);
        dir.delete(Some(&curator), ids[0]).unwrap();
        assert_eq!(dir.get(ids[0]), Err(CoreError::NotFound(ids[0])));
    }

    #[test]
    fn maps_link_joins_words() {
        assert_eq!(maps_link("  Rua  das Flores 10 "),
                   "https://www.google.com/maps/search/?api=1&query=Rua+das+Flores+10");
    }

    #[test]
    fn summary_labels() {
        let (dir, ids) = seeded();
        let mut space = dir.get(ids[0]).unwrap();
        let s = SpaceSummary::from(&space);
        assert_eq!(s.rating_label, "N/A");
        assert_eq!(s.more_label(), None);
        space.fields.rating = 4;
        space.fields.theme_tags = ["a", "b", "c", "d", "e"].map(String::from).to_vec();
        let s = SpaceSummary::from(&space);
        assert_eq!(s.rating_label, "4.0");
        assert_eq!(s.theme_tags.len(), 3);
        assert_eq!(s.more_label().as_deref(), Some("+2 more"));
    }
}
