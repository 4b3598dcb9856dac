//! Guarda de salida: lectura pura del estado del asistente.

use super::Wizard;
use crate::constants::UNSAVED_CHANGES_MESSAGE;
use crate::gateway::PersistenceGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitDecision {
    /// Salir sin preguntar.
    Allow,
    /// Pedir confirmación explícita antes de salir.
    Confirm { message: &'static str },
}

impl ExitDecision {
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, ExitDecision::Confirm { .. })
    }
}

/// Se consulta justo antes de cerrar o abandonar la página del asistente.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitGuard;

impl ExitGuard {
    pub fn check<G: PersistenceGateway>(wizard: &Wizard<G>) -> ExitDecision {
        if wizard.is_dirty() {
            ExitDecision::Confirm { message: UNSAVED_CHANGES_MESSAGE }
        } else {
            ExitDecision::Allow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemorySpaceGateway;
    use saberes_domain::{Field, FieldValue};

    #[test]
    fn allows_clean_and_confirms_dirty() {
        let mut w = Wizard::register(InMemorySpaceGateway::new());
        assert_eq!(ExitGuard::check(&w), ExitDecision::Allow);
        w.on_field_change(Field::Name, FieldValue::text("Museu")).unwrap();
        let decision = ExitGuard::check(&w);
        assert!(decision.requires_confirmation());
        assert_eq!(decision, ExitDecision::Confirm { message: UNSAVED_CHANGES_MESSAGE });
    }
}
