//! Asistente multipaso: navegación, fusión de fragmentos, detección de
//! cambios sin guardar y envío al gateway de persistencia.

mod builder;
mod config;
mod aggregator;
mod guard;

pub use builder::WizardBuilder;
pub use config::{ValidationMode, WizardConfig};
pub use aggregator::{Wizard, WizardMode};
pub use guard::{ExitDecision, ExitGuard};

/// Libera las URLs de vista previa locales (`blob:`) de un borrador enviado.
pub trait PreviewRevoker {
    fn revoke(&mut self, url: &str);
}

impl<F: FnMut(&str)> PreviewRevoker for F {
    fn revoke(&mut self, url: &str) {
        self(url)
    }
}
