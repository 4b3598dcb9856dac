//! Controladores de formulario por paso.

mod controller;
mod media;
mod validation;

pub use controller::StepController;
pub use media::{object_path, sanitize_file_name, PendingUpload};
pub use validation::{is_valid_email, validate_step, FieldError};
