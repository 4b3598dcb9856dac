//! Utilidades para fusionar fragmentos de forma determinista.
//!
//! El merge es "shallow": las claves de `b` reemplazan a las de `a` y las
//! que sólo existen en `a` se mantienen. No hay merge profundo de listas;
//! un fragmento siempre trae la lista completa de un campo.

use super::{DraftRecord, StepFragment};

/// Merge shallow: keys from `b` override keys from `a`.
pub fn merge_fragment(a: &StepFragment, b: &StepFragment) -> StepFragment {
    let mut out = a.clone();
    for (field, value) in b.iter() {
        out.insert(*field, value.clone());
    }
    out
}

/// Unión por clave de una secuencia de fragmentos, en orden. Ante claves
/// repetidas gana el fragmento posterior.
pub fn merge_all<'a, I>(fragments: I) -> DraftRecord
    where I: IntoIterator<Item = &'a StepFragment>
{
    let mut draft = DraftRecord::default();
    for fragment in fragments {
        for (field, value) in fragment.iter() {
            draft.insert(*field, value.clone());
        }
    }
    draft
}
