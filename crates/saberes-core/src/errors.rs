//! Errores específicos del core.

use saberes_domain::{DomainError, Field};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::FieldError;
use crate::gateway::GatewayError;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("invalid step index: {0}")] InvalidStepIndex(usize),
    #[error("field '{field}' does not belong to step {step}")] FieldNotInStep { field: Field, step: usize },
    #[error("'{tag}' is not an option of '{field}'")] UnknownOption { field: Field, tag: String },
    #[error("item {index} out of range for '{field}'")] ItemOutOfRange { field: Field, index: usize },
    #[error("submission is only enabled at the last step")] NotAtLastStep,
    #[error("save is only available when editing an existing space")] NotEditing,
    #[error("Authentication error. Please log in again.")] Unauthenticated,
    #[error("actor is not allowed to manage spaces")] Forbidden,
    #[error("validation failed: {0:?}")] Validation(Vec<FieldError>),
    #[error("an upload is already in progress")] UploadInFlight,
    #[error("could not determine the storage path of '{0}'")] UnknownMediaPath(String),
    #[error("space not found: {0}")] NotFound(uuid::Uuid),
    /// Fallo del gateway de persistencia; el mensaje se muestra tal cual.
    #[error("{0}")] Persistence(String),
    /// Fallo del almacenamiento de objetos; el mensaje se muestra tal cual.
    #[error("{0}")] Storage(String),
    #[error("domain: {0}")] Domain(String),
}

impl From<DomainError> for CoreError {
    fn from(e: DomainError) -> Self {
        CoreError::Domain(e.to_string())
    }
}

impl CoreError {
    pub fn persistence(e: GatewayError) -> Self {
        CoreError::Persistence(e.to_string())
    }

    pub fn storage(e: GatewayError) -> Self {
        CoreError::Storage(e.to_string())
    }
}
