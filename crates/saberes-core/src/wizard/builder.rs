//! Builder para `Wizard`.
//!
//! Permite sustituir el registro de pasos, fijar la política de validación,
//! registrar quién revoca las URLs de vista previa y abrir la edición de un
//! espacio existente.
//!
//! ```ignore
//! let wizard = Wizard::builder(gateway)
//!     .validation(ValidationMode::Blocking)
//!     .revoker(|url: &str| { previews.remove(url); })
//!     .editing(&space)
//!     .build();
//! ```

use std::sync::Arc;

use saberes_domain::{Space, SpaceFields};
use uuid::Uuid;

use super::{PreviewRevoker, ValidationMode, Wizard, WizardConfig};
use crate::gateway::PersistenceGateway;
use crate::step::StepRegistry;

pub struct WizardBuilder<G: PersistenceGateway> {
    gateway: G,
    registry: Option<Arc<StepRegistry>>,
    config: WizardConfig,
    revoker: Option<Box<dyn PreviewRevoker>>,
    existing: Option<(Uuid, SpaceFields)>,
}

impl<G: PersistenceGateway> WizardBuilder<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway,
               registry: None,
               config: WizardConfig::default(),
               revoker: None,
               existing: None }
    }

    /// Usa otro registro de pasos (por defecto, el formulario de espacios).
    pub fn registry(mut self, registry: Arc<StepRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(mut self, config: WizardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    pub fn revoker<R: PreviewRevoker + 'static>(mut self, revoker: R) -> Self {
        self.revoker = Some(Box::new(revoker));
        self
    }

    /// Abre el asistente en modo edición con los valores de `space`.
    pub fn editing(mut self, space: &Space) -> Self {
        self.existing = Some((space.id, space.fields.clone()));
        self
    }

    #[inline]
    pub fn build(self) -> Wizard<G> {
        Wizard::from_parts(self.gateway, self.registry, self.config, self.revoker, self.existing)
    }
}
