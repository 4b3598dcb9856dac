//! Adjuntar medios al paso "about".
//!
//! La subida ocurre en dos fases: `begin_upload` valida la identidad, fija la
//! ruta del objeto y marca el controlador como ocupado; `finish_upload`
//! borra el objeto anterior (sin abortar si falla), sube el nuevo y recién
//! entonces emite la URL. Un registro tiene como máximo un objeto.

use chrono::Utc;
use saberes_domain::{Field, FieldValue};

use super::StepController;
use crate::errors::CoreError;
use crate::fragment::StepFragment;
use crate::gateway::ObjectStorage;
use crate::identity::Actor;

/// Subida reservada por `begin_upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Ruta del objeto nuevo dentro del bucket.
    pub path: String,
    /// Ruta del objeto que se reemplaza, si hay uno.
    pub replaces: Option<String>,
}

/// Reemplaza por `_` todo carácter fuera de `[A-Za-z0-9.]`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' }).collect()
}

/// `<actor>/<millis>-<nombre saneado>`.
pub fn object_path(actor_id: &uuid::Uuid, file_name: &str, millis: i64) -> String {
    format!("{actor_id}/{millis}-{}", sanitize_file_name(file_name))
}

/// Ningún efecto sobre el almacenamiento sin permiso de gestión.
fn authorize(actor: Option<&Actor>) -> Result<&Actor, CoreError> {
    let actor = actor.ok_or(CoreError::Unauthenticated)?;
    if !actor.can_manage_spaces() {
        return Err(CoreError::Forbidden);
    }
    Ok(actor)
}

impl StepController {
    /// Reserva la subida de `file_name`. Falla sin efectos si no hay actor,
    /// si el actor no gestiona espacios o si ya hay una subida en curso.
    pub fn begin_upload(&mut self, storage: &dyn ObjectStorage, actor: Option<&Actor>, file_name: &str,
                        millis: i64)
                        -> Result<PendingUpload, CoreError> {
        self.check_owned(Field::MediaUrls)?;
        if self.uploading {
            return Err(CoreError::UploadInFlight);
        }
        let actor = authorize(actor)?;
        let replaces = self.media_path.clone().or_else(|| {
                                                   self.current_media_url()
                                                       .and_then(|url| storage.path_from_url(&url))
                                               });
        self.uploading = true;
        Ok(PendingUpload { path: object_path(&actor.id, file_name, millis),
                           replaces })
    }

    /// Completa una subida reservada. La URL nueva sólo se emite si la
    /// subida tuvo éxito; ante error el campo de medios queda como estaba.
    pub fn finish_upload(&mut self, storage: &mut dyn ObjectStorage, pending: PendingUpload, bytes: &[u8])
                         -> Result<Option<StepFragment>, CoreError> {
        self.uploading = false;
        if let Some(previous) = pending.replaces.as_deref() {
            if let Err(e) = storage.remove(previous) {
                log::warn!("no se pudo borrar el medio anterior '{previous}': {e}");
            }
        }
        let url = storage.upload(&pending.path, bytes).map_err(CoreError::storage)?;
        log::debug!("medio subido en {}", pending.path);
        self.media_path = Some(pending.path);
        self.set_local(Field::MediaUrls, FieldValue::List(vec![url]));
        Ok(self.emit())
    }

    /// Atajo de las dos fases con la hora actual.
    pub fn attach_media(&mut self, storage: &mut dyn ObjectStorage, actor: Option<&Actor>, file_name: &str,
                        bytes: &[u8])
                        -> Result<Option<StepFragment>, CoreError> {
        let pending = self.begin_upload(storage, actor, file_name, Utc::now().timestamp_millis())?;
        self.finish_upload(storage, pending, bytes)
    }

    /// Borra el objeto actual y limpia la URL sólo si el borrado tuvo éxito.
    pub fn detach_media(&mut self, storage: &mut dyn ObjectStorage, actor: Option<&Actor>)
                        -> Result<Option<StepFragment>, CoreError> {
        self.check_owned(Field::MediaUrls)?;
        authorize(actor)?;
        if self.uploading {
            return Err(CoreError::UploadInFlight);
        }
        let Some(url) = self.current_media_url() else {
            return Ok(None);
        };
        let path = self.media_path
                       .clone()
                       .or_else(|| storage.path_from_url(&url))
                       .ok_or_else(|| CoreError::UnknownMediaPath(url.clone()))?;
        storage.remove(&path).map_err(CoreError::storage)?;
        self.media_path = None;
        self.set_local(Field::MediaUrls, FieldValue::List(Vec::new()));
        Ok(self.emit())
    }

    fn current_media_url(&self) -> Option<String> {
        match self.current(Field::MediaUrls) {
            FieldValue::List(urls) => urls.into_iter().find(|u| !u.trim().is_empty()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, InMemoryObjectStorage, PublicUrl};
    use crate::identity::Role;
    use crate::step::space_steps;
    use uuid::Uuid;

    fn about() -> StepController {
        let reg = space_steps();
        StepController::new(0, reg.get(0).unwrap().clone(), reg.initial_fragment(0, None).unwrap())
    }

    fn curator() -> Actor {
        Actor::new(Uuid::new_v4(), "curadora@saberes.org", Role::Curator)
    }

    struct FailingRemove(InMemoryObjectStorage);

    impl ObjectStorage for FailingRemove {
        fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<PublicUrl, GatewayError> {
            self.0.upload(path, bytes)
        }
        fn remove(&mut self, _path: &str) -> Result<(), GatewayError> {
            Err(GatewayError::new("remove denied"))
        }
        fn public_url(&self, path: &str) -> PublicUrl {
            self.0.public_url(path)
        }
    }

    #[test]
    fn sanitizes_everything_but_alnum_and_dot() {
        assert_eq!(sanitize_file_name("foto da sala (1).png"), "foto_da_sala__1_.png");
        assert_eq!(sanitize_file_name("café.jpg"), "caf_.jpg");
    }

    #[test]
    fn upload_without_actor_has_no_side_effects() {
        let mut c = about();
        let mut st = InMemoryObjectStorage::default();
        let err = c.attach_media(&mut st, None, "a.png", b"x").unwrap_err();
        assert_eq!(err, CoreError::Unauthenticated);
        assert!(st.objects.is_empty());
        assert!(!c.is_uploading());
    }

    #[test]
    fn reentrant_upload_is_rejected() {
        let mut c = about();
        let st = InMemoryObjectStorage::default();
        let actor = curator();
        let _pending = c.begin_upload(&st, Some(&actor), "a.png", 1).unwrap();
        assert!(c.is_uploading());
        assert_eq!(c.begin_upload(&st, Some(&actor), "b.png", 2), Err(CoreError::UploadInFlight));
    }

    #[test]
    fn url_is_withheld_until_upload_completes() {
        let mut c = about();
        let mut st = InMemoryObjectStorage::default();
        let actor = curator();
        let pending = c.begin_upload(&st, Some(&actor), "a.png", 10).unwrap();
        assert_eq!(c.fragment().get(Field::MediaUrls), Some(&FieldValue::List(vec![])));
        let f = c.finish_upload(&mut st, pending, b"x").unwrap().unwrap();
        let url = st.public_url(&format!("{}/10-a.png", actor.id));
        assert_eq!(f.get(Field::MediaUrls), Some(&FieldValue::list([url])));
    }

    #[test]
    fn replacing_keeps_a_single_object() {
        let mut c = about();
        let mut st = InMemoryObjectStorage::default();
        let actor = curator();
        let p = c.begin_upload(&st, Some(&actor), "a.png", 1).unwrap();
        c.finish_upload(&mut st, p, b"1").unwrap();
        let p = c.begin_upload(&st, Some(&actor), "b.png", 2).unwrap();
        assert!(p.replaces.is_some());
        c.finish_upload(&mut st, p, b"2").unwrap();
        assert_eq!(st.objects.len(), 1);
    }

    #[test]
    fn failed_delete_does_not_block_replacement() {
        let mut c = about();
        let mut st = FailingRemove(InMemoryObjectStorage::default());
        let actor = curator();
        let p = c.begin_upload(&st, Some(&actor), "a.png", 1).unwrap();
        c.finish_upload(&mut st, p, b"1").unwrap();
        let p = c.begin_upload(&st, Some(&actor), "b.png", 2).unwrap();
        let f = c.finish_upload(&mut st, p, b"2").unwrap().unwrap();
        assert_eq!(f.get(Field::MediaUrls).and_then(FieldValue::as_list).map(|l| l.len()), Some(1));
        assert_eq!(st.0.objects.len(), 2);
    }

    #[test]
    fn detach_keeps_url_when_remove_fails() {
        let mut c = about();
        let mut st = FailingRemove(InMemoryObjectStorage::default());
        let actor = curator();
        c.attach_media(&mut st, Some(&actor), "a.png", b"1").unwrap();
        let before = c.fragment();
        assert!(matches!(c.detach_media(&mut st, Some(&actor)), Err(CoreError::Storage(_))));
        assert_eq!(c.fragment(), before);
    }

    #[test]
    fn detach_clears_url() {
        let mut c = about();
        let mut st = InMemoryObjectStorage::default();
        let actor = curator();
        c.attach_media(&mut st, Some(&actor), "a.png", b"1").unwrap();
        let f = c.detach_media(&mut st, Some(&actor)).unwrap().unwrap();
        assert_eq!(f.get(Field::MediaUrls), Some(&FieldValue::List(vec![])));
        assert!(st.objects.is_empty());
    }

    #[test]
    fn visitor_cannot_touch_storage() {
        let mut c = about();
        let mut st = InMemoryObjectStorage::default();
        let owner = curator();
        c.attach_media(&mut st, Some(&owner), "capa.png", b"1").unwrap();
        let before = c.fragment();

        let visitor = Actor::new(Uuid::new_v4(), "v@saberes.org", Role::Visitor);
        assert_eq!(c.attach_media(&mut st, Some(&visitor), "outra.png", b"2"), Err(CoreError::Forbidden));
        assert!(!c.is_uploading());
        assert_eq!(c.detach_media(&mut st, Some(&visitor)), Err(CoreError::Forbidden));
        assert_eq!(c.detach_media(&mut st, None), Err(CoreError::Unauthenticated));
        assert_eq!(st.objects.len(), 1);
        assert_eq!(c.fragment(), before);
    }
}
