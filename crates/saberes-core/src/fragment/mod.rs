//! Fragmentos de paso, borrador fusionado y utilidades de merge.

mod draft;
mod merge;

pub use draft::{DraftRecord, StepFragment};
pub use merge::{merge_all, merge_fragment};
