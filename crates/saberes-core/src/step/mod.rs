pub mod definition;
pub mod registry;
pub mod status;

pub use definition::FormStep;
pub use registry::{space_steps, StepRegistry, ACCESS_OPTIONS, DISCIPLINE_OPTIONS, INCLUSION_OPTIONS, THEME_OPTIONS};
pub use status::StepStatus;
