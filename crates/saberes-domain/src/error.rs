// error.rs
use thiserror::Error;

/// Error del dominio de registros de espacios.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),

    #[error("campo desconocido: {0}")]
    UnknownField(String),

    #[error("Error de serialización: {0}")]
    SerializationError(String),
}

// Conversión desde serde_json::Error a DomainError
impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}
