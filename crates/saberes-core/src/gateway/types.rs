//! Tipos compartidos por los gateways.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// URL pública de un objeto almacenado.
pub type PublicUrl = String;

/// Error opaco de un servicio externo. El core no interpreta códigos: sólo
/// propaga el mensaje.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Orden de listado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpaceOrder {
    /// Más recientes primero (listado del directorio).
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    NameAsc,
}
