use saberes_domain::{Field, FieldKind, FieldValue, InterdisciplinaryAssociation, Space, SpaceFields};
use serde_json::json;

#[test]
fn test_every_field_roundtrips_through_its_name() {
    for field in Field::ALL {
        let parsed: Field = field.as_str().parse().unwrap();
        assert_eq!(parsed, field);
    }
    assert!("nope".parse::<Field>().is_err());
}

#[test]
fn test_zero_value_is_accepted_by_its_kind() {
    for field in Field::ALL {
        let zero = field.kind().zero_value();
        assert!(field.kind().accepts(&zero), "zero value de {field} debe ser aceptado");
    }
}

#[test]
fn test_default_fields_expose_zero_values() {
    let fields = SpaceFields::default();
    for field in Field::ALL {
        assert_eq!(fields.get(field), field.kind().zero_value(), "campo {field}");
    }
}

#[test]
fn test_pruned_drops_blank_entries() {
    let v = FieldValue::list(["a", "", "  ", "b"]);
    assert_eq!(v.pruned(), FieldValue::list(["a", "b"]));

    let rows = FieldValue::Associations(vec![InterdisciplinaryAssociation { response: " ".into(),
                                                                            disciplines: vec!["Física".into()] },
                                             InterdisciplinaryAssociation { response: "energia".into(),
                                                                            disciplines: vec![] }]);
    match rows.pruned() {
        FieldValue::Associations(kept) => {
            assert_eq!(kept.len(), 1);
            assert_eq!(kept[0].response, "energia");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_space_deserializes_from_row_json() {
    let raw = json!({
        "id": "6f1c1a52-5d1b-4d44-9a8a-1b9b5a0c2f11",
        "user_id": "0b8f5a52-1d1b-4d44-9a8a-1b9b5a0c2f22",
        "name": "Museu A",
        "rating": 4,
        "theme_tags": ["Sustainability"],
        "technology_relationships": [{"technologyName": "QR Code", "physics": "", "chemistry": "", "mathematics": "x"}],
        "digital_technologies": null,
        "type": "museum",
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-01T12:00:00Z"
    });
    let space: Space = serde_json::from_value(raw).unwrap();
    assert_eq!(space.fields.name, "Museu A");
    assert_eq!(space.fields.rating, 4);
    assert_eq!(space.kind.as_deref(), Some("museum"));
    assert!(space.fields.digital_technologies.is_empty());
    assert_eq!(space.fields.technology_relationships[0].technology_name, "QR Code");
}

#[test]
fn test_kinds_of_list_fields() {
    assert_eq!(Field::MediaUrls.kind(), FieldKind::MediaList);
    assert_eq!(Field::InclusionTags.kind(), FieldKind::TagSet);
    assert!(Field::Contents.kind().is_list());
    assert!(!Field::Rating.kind().is_list());
}
