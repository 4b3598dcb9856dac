//! Pruebas de merge de fragmentos.
//!
//! Semántica shallow: las claves de `b` sobreescriben las de `a`; el
//! borrador es la unión por clave del último fragmento de cada paso.

use proptest::prelude::*;
use saberes_core::{merge_all, merge_fragment, InMemorySpaceGateway, StepFragment, Wizard};
use saberes_domain::{Field, FieldValue};

#[test]
fn merge_shallow_overrides_keys() {
    let a = StepFragment::new().with(Field::Name, FieldValue::text("A"))
                               .with(Field::Address, FieldValue::text("Rua 1"))
                               .with(Field::OtherThemes, FieldValue::list(["x", "y"]));
    let b = StepFragment::new().with(Field::Name, FieldValue::text("B"))
                               .with(Field::OtherThemes, FieldValue::list(["z"]));

    let out = merge_fragment(&a, &b);

    assert_eq!(out.get(Field::Name), Some(&FieldValue::text("B")));
    // claves que sólo existen en a se mantienen
    assert_eq!(out.get(Field::Address), Some(&FieldValue::text("Rua 1")));
    // las listas se reemplazan completas
    assert_eq!(out.get(Field::OtherThemes), Some(&FieldValue::list(["z"])));
}

#[test]
fn merge_all_keeps_later_fragment_on_conflict() {
    let a = StepFragment::new().with(Field::Rating, FieldValue::Rating(1));
    let b = StepFragment::new().with(Field::Rating, FieldValue::Rating(3));
    assert_eq!(merge_all([&a, &b]).get(Field::Rating), Some(&FieldValue::Rating(3)));
}

/// Edición de un paso del formulario de espacios: (paso, campo, valor).
fn step_edit() -> impl Strategy<Value = (usize, Field, FieldValue)> {
    prop_oneof![(0usize..=0, Just(Field::Name), "[a-z ]{0,8}".prop_map(FieldValue::text)),
                (0usize..=0, Just(Field::Rating), (0u8..=5).prop_map(FieldValue::Rating)),
                (2usize..=2, Just(Field::MainTheme), "[a-z]{0,6}".prop_map(FieldValue::text)),
                (3usize..=3,
                 Just(Field::AdditionalInclusion),
                 prop::collection::vec("[a-z]{0,4}", 0..4).prop_map(FieldValue::List)),
                (5usize..=5, Just(Field::Contents), prop::collection::vec("[a-z]{1,4}", 0..3).prop_map(FieldValue::List)),]
}

proptest! {
    /// El borrador sólo depende del último fragmento de cada paso, no del
    /// orden en que se intercalan pasos distintos.
    #[test]
    fn draft_is_independent_of_cross_step_order(edits in prop::collection::vec(step_edit(), 0..12)) {
        let mut in_order = Wizard::register(InMemorySpaceGateway::new());
        for (step, field, value) in &edits {
            in_order.receive_fragment(*step, StepFragment::new().with(*field, value.clone())).unwrap();
        }

        // Mismo historial por paso, pero recorriendo los pasos en orden inverso.
        let mut by_step = Wizard::register(InMemorySpaceGateway::new());
        for target in (0..6).rev() {
            for (step, field, value) in edits.iter().filter(|(s, _, _)| *s == target) {
                by_step.receive_fragment(*step, StepFragment::new().with(*field, value.clone())).unwrap();
            }
        }

        prop_assert_eq!(in_order.draft(), by_step.draft());
    }

    #[test]
    fn received_lists_never_hold_blanks(items in prop::collection::vec("[a ]{0,3}", 0..6)) {
        let mut w = Wizard::register(InMemorySpaceGateway::new());
        w.receive_fragment(3, StepFragment::new().with(Field::AdditionalInclusion, FieldValue::List(items))).unwrap();
        let draft = w.draft();
        let list = draft.get(Field::AdditionalInclusion).and_then(FieldValue::as_list).unwrap_or(&[]);
        prop_assert!(list.iter().all(|s| !s.trim().is_empty()));
    }
}
