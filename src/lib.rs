//! Saberes: registro y edición de espacios educativos.
//!
//! Este crate reexporta las piezas de la workspace para usarlas desde
//! `main.rs`, los tests de integración u otros clientes:
//! - `domain`: campos, valores y registro `Space`.
//! - `core`: pasos, controladores, asistente, guarda de salida y directorio.
//! - `persistence`: gateway Postgres y almacenamiento en disco.

pub use saberes_core as core;
pub use saberes_domain as domain;
pub use saberes_persistence as persistence;

pub use saberes_core::{Actor, CoreError, Directory, ExitDecision, ExitGuard, Role, ValidationMode, Wizard,
                       WizardMode};
pub use saberes_domain::{Field, FieldValue, Space, SpaceFields};
