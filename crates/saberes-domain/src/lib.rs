// saberes-domain library entry point
pub mod error;
pub mod field;
pub mod space;
pub mod value;
pub use error::DomainError;
pub use field::{Field, FieldKind};
pub use space::{NewSpace, Space, SpaceFields};
pub use value::{FieldValue, InterdisciplinaryAssociation, TechnologyRelationship, MAX_RATING};
