//! Implementación de los subcomandos sobre el gateway Postgres.

use std::path::Path;

use saberes_core::{maps_link, space_steps, Actor, CoreError, Directory, PersistenceGateway, Role, SpaceSummary,
                   ValidationMode, Wizard};
use saberes_domain::{Field, FieldValue};
use saberes_persistence::{build_dev_pool_from_env, FsObjectStorage, PersistenceError, PgSpaceGateway, PoolProvider,
                          StorageConfig};
use serde_json::Value;
use uuid::Uuid;

type Gateway = Box<dyn PersistenceGateway>;

pub struct Backend {
    gateway: Gateway,
}

impl Backend {
    pub fn from_env() -> Result<Self, PersistenceError> {
        let pool = build_dev_pool_from_env()?;
        Ok(Self { gateway: Box::new(PgSpaceGateway::new(PoolProvider { pool })) })
    }
}

/// Actor configurado en el entorno; sin `SABERES_ACTOR_ID` no hay sesión.
pub fn actor_from_env() -> Option<Actor> {
    let id = std::env::var("SABERES_ACTOR_ID").ok()?;
    let id = match Uuid::parse_str(id.trim()) {
        Ok(id) => id,
        Err(e) => {
            log::warn!("SABERES_ACTOR_ID inválido: {e}");
            return None;
        }
    };
    let email = std::env::var("SABERES_ACTOR_EMAIL").unwrap_or_default();
    let role = std::env::var("SABERES_ACTOR_ROLE").ok()
                                                  .and_then(|r| r.parse::<Role>().map_err(|e| log::warn!("{e}")).ok())
                                                  .unwrap_or_default();
    Some(Actor::new(id, email, role))
}

pub fn steps() {
    for (i, step) in space_steps().steps().iter().enumerate() {
        println!("{}. {} ({})", i + 1, step.title, step.id);
        for field in &step.fields {
            let marker = if step.is_required(*field) { "*" } else { " " };
            println!("   {marker} {field} [{:?}]", field.kind());
        }
    }
}

pub fn list(backend: Backend, search: Option<&str>, json: bool) -> Result<(), CoreError> {
    let dir = Directory::new(backend.gateway);
    let spaces = dir.search(search.unwrap_or_default())?;
    if json {
        let summaries: Vec<SpaceSummary> = spaces.iter().map(SpaceSummary::from).collect();
        println!("{}", serde_json::to_string_pretty(&summaries).map_err(|e| CoreError::Domain(e.to_string()))?);
        return Ok(());
    }
    for space in &spaces {
        let s = SpaceSummary::from(space);
        let more = s.more_label().map(|m| format!(" {m}")).unwrap_or_default();
        println!("{}  {:<40} {:>4}  {}{}", s.id, s.name, s.rating_label, s.theme_tags.join(", "), more);
    }
    Ok(())
}

pub fn show(backend: Backend, id: Uuid) -> Result<(), CoreError> {
    let space = Directory::new(backend.gateway).get(id)?;
    println!("{}", serde_json::to_string_pretty(&space).map_err(|e| CoreError::Domain(e.to_string()))?);
    if !space.fields.address.trim().is_empty() {
        println!("maps: {}", maps_link(&space.fields.address));
    }
    Ok(())
}

pub fn delete(backend: Backend, actor: Option<&Actor>, id: Uuid) -> Result<(), CoreError> {
    let mut dir = Directory::new(backend.gateway);
    dir.get(id)?;
    dir.delete(actor, id)?;
    println!("eliminado: {id}");
    Ok(())
}

/// Los campos de texto toman `raw` literal; el resto se lee como JSON.
fn parse_value(field: Field, raw: &str) -> Result<FieldValue, CoreError> {
    let json = match field.kind().zero_value() {
        FieldValue::Text(_) => Value::String(raw.to_string()),
        _ => serde_json::from_str::<Value>(raw).map_err(|e| CoreError::Domain(format!("{field}: {e}")))?,
    };
    Ok(FieldValue::from_json(field, json)?)
}

fn apply_all(wizard: &mut Wizard<Gateway>, values: Vec<(Field, FieldValue)>) -> Result<(), CoreError> {
    for (field, value) in values {
        wizard.on_field_change(field, value)?;
    }
    Ok(())
}

fn report_errors(wizard: &Wizard<Gateway>) {
    for e in wizard.validation_errors() {
        eprintln!("aviso: {}: {}", e.field, e.message);
    }
}

pub fn register(backend: Backend, actor: Option<&Actor>, input: &Path, mode: ValidationMode)
                -> Result<(), CoreError> {
    let text = std::fs::read_to_string(input).map_err(|e| CoreError::Domain(format!("{}: {e}", input.display())))?;
    let object: serde_json::Map<String, Value> =
        serde_json::from_str(&text).map_err(|e| CoreError::Domain(format!("{}: {e}", input.display())))?;
    let values = object.into_iter()
                       .map(|(key, v)| {
                           let field: Field = key.parse()?;
                           Ok((field, FieldValue::from_json(field, v)?))
                       })
                       .collect::<Result<Vec<_>, CoreError>>()?;

    log::debug!("registrando desde {} con validación {mode:?}", input.display());
    let mut wizard = Wizard::builder(backend.gateway).validation(mode).build();
    apply_all(&mut wizard, values)?;
    report_errors(&wizard);
    wizard.go_to(wizard.step_count() - 1);
    let space = wizard.submit(actor)?;
    println!("registrado: {}", space.id);
    Ok(())
}

pub fn edit(backend: Backend, actor: Option<&Actor>, id: Uuid, sets: &[String], mode: ValidationMode)
            -> Result<(), CoreError> {
    let values = sets.iter()
                     .map(|s| {
                         let (key, raw) =
                             s.split_once('=').ok_or_else(|| CoreError::Domain(format!("se esperaba campo=valor: {s}")))?;
                         let field: Field = key.trim().parse()?;
                         Ok((field, parse_value(field, raw)?))
                     })
                     .collect::<Result<Vec<_>, CoreError>>()?;

    let dir = Directory::new(backend.gateway);
    let space = dir.get(id)?;
    let mut wizard = Wizard::builder(dir.into_gateway()).editing(&space).validation(mode).build();
    apply_all(&mut wizard, values)?;
    if !wizard.is_dirty() {
        println!("sin cambios: {id}");
        return Ok(());
    }
    log::debug!("editando {id} con validación {mode:?}");
    report_errors(&wizard);
    let space = wizard.save_changes(actor)?;
    println!("actualizado: {}", space.id);
    Ok(())
}

pub fn attach(backend: Backend, actor: Option<&Actor>, id: Uuid, file: &Path) -> Result<(), CoreError> {
    let bytes = std::fs::read(file).map_err(|e| CoreError::Domain(format!("{}: {e}", file.display())))?;
    let name = file.file_name().and_then(|n| n.to_str()).unwrap_or("media");
    let mut storage = FsObjectStorage::from_config(&StorageConfig::from_env());

    log::debug!("adjuntando {} ({} bytes) a {id}", file.display(), bytes.len());
    let mut wizard = Wizard::load(backend.gateway, id)?;
    wizard.attach_media(&mut storage, actor, name, &bytes)?;
    let space = wizard.save_changes(actor)?;
    println!("medio: {}", space.fields.media_urls.first().map(String::as_str).unwrap_or(""));
    Ok(())
}
