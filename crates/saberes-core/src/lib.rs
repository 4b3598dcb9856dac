//! saberes-core: asistente de registro/edición de espacios educativos.
//!
//! Registro de pasos, controladores por paso, agregador (`Wizard`), guarda
//! de salida, directorio y los contratos de persistencia y almacenamiento
//! que la capa de infraestructura implementa.
pub mod constants;
pub mod directory;
pub mod errors;
pub mod form;
pub mod fragment;
pub mod gateway;
pub mod identity;
pub mod step;
pub mod wizard;

pub use directory::{maps_link, search, Directory, SpaceSummary};
pub use errors::CoreError;
pub use form::{FieldError, PendingUpload, StepController};
pub use fragment::{merge_all, merge_fragment, DraftRecord, StepFragment};
pub use gateway::{GatewayError, InMemoryObjectStorage, InMemorySpaceGateway, ObjectStorage, PersistenceGateway,
                  PublicUrl, SpaceOrder};
pub use identity::{Actor, Role};
pub use step::{space_steps, FormStep, StepRegistry, StepStatus};
pub use wizard::{ExitDecision, ExitGuard, PreviewRevoker, ValidationMode, Wizard, WizardBuilder, WizardConfig,
                 WizardMode};
