//! Configuración del asistente.

use serde::{Deserialize, Serialize};

/// Política de validación.
///
/// `Soft` muestra los errores pero no impide navegar ni enviar (el
/// comportamiento observado de los formularios). `Blocking` rechaza
/// `advance` mientras el paso actual tenga errores y `submit` mientras
/// cualquier paso los tenga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Soft,
    Blocking,
}

impl std::str::FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(ValidationMode::Soft),
            "blocking" => Ok(ValidationMode::Blocking),
            other => Err(format!("modo de validación desconocido: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default)]
    pub validation: ValidationMode,
}

impl WizardConfig {
    pub fn blocking() -> Self {
        Self { validation: ValidationMode::Blocking }
    }

    pub fn is_blocking(&self) -> bool {
        self.validation == ValidationMode::Blocking
    }
}
