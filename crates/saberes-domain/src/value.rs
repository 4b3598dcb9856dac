//! Valores de campo y tipos de fila anidados.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::{Field, FieldKind};
use crate::DomainError;

/// Calificación máxima (estrellas).
pub const MAX_RATING: u8 = 5;

/// Punto interdisciplinario citado a partir de la visita.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterdisciplinaryAssociation {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub disciplines: Vec<String>,
}

impl InterdisciplinaryAssociation {
    /// Fila sin respuesta: se descarta al normalizar.
    pub fn is_blank(&self) -> bool {
        self.response.trim().is_empty()
    }
}

/// Relación de una tecnología del espacio con física, química y matemática.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TechnologyRelationship {
    #[serde(rename = "technologyName", default)]
    pub technology_name: String,
    #[serde(default)]
    pub physics: String,
    #[serde(default)]
    pub chemistry: String,
    #[serde(default)]
    pub mathematics: String,
}

impl TechnologyRelationship {
    pub fn is_blank(&self) -> bool {
        self.technology_name.trim().is_empty()
    }
}

/// Valor de un campo. La igualdad es estructural (derivada), nunca por
/// serialización.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Rating(u8),
    List(Vec<String>),
    Associations(Vec<InterdisciplinaryAssociation>),
    Relationships(Vec<TechnologyRelationship>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// `true` para texto vacío (o sólo espacios) y listas vacías. Una
    /// calificación nunca es "vacía".
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Rating(_) => false,
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Associations(rows) => rows.is_empty(),
            FieldValue::Relationships(rows) => rows.is_empty(),
        }
    }

    /// Copia sin entradas en blanco. Los valores escalares se devuelven tal
    /// cual.
    pub fn pruned(&self) -> FieldValue {
        match self {
            FieldValue::List(items) => {
                FieldValue::List(items.iter().filter(|s| !s.trim().is_empty()).cloned().collect())
            }
            FieldValue::Associations(rows) => {
                FieldValue::Associations(rows.iter().filter(|r| !r.is_blank()).cloned().collect())
            }
            FieldValue::Relationships(rows) => {
                FieldValue::Relationships(rows.iter().filter(|r| !r.is_blank()).cloned().collect())
            }
            other => other.clone(),
        }
    }

    /// Interpreta `value` según el tipo de `field`.
    ///
    /// `null` se interpreta como el valor vacío del tipo (las columnas de
    /// lista antiguas pueden venir nulas). Un número para un campo de texto
    /// se rechaza: no hay coerciones implícitas.
    pub fn from_json(field: Field, value: Value) -> Result<FieldValue, DomainError> {
        let kind = field.kind();
        if value.is_null() {
            return Ok(kind.zero_value());
        }
        let parsed = match kind {
            FieldKind::Text | FieldKind::Date | FieldKind::Email => match value {
                Value::String(s) => FieldValue::Text(s),
                other => return Err(mismatch(field, &other)),
            },
            FieldKind::Rating => {
                let n = value.as_u64().ok_or_else(|| mismatch(field, &value))?;
                let rating = u8::try_from(n).ok().filter(|r| *r <= MAX_RATING).ok_or_else(|| {
                    DomainError::ValidationError(format!("rating fuera de rango (0..={MAX_RATING}): {n}"))
                })?;
                FieldValue::Rating(rating)
            }
            FieldKind::TextList | FieldKind::TagSet | FieldKind::MediaList => {
                FieldValue::List(serde_json::from_value(value)?)
            }
            FieldKind::Associations => FieldValue::Associations(serde_json::from_value(value)?),
            FieldKind::Relationships => FieldValue::Relationships(serde_json::from_value(value)?),
        };
        Ok(parsed)
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Rating(r) => Value::from(*r),
            FieldValue::List(items) => Value::from(items.clone()),
            FieldValue::Associations(rows) => serde_json::to_value(rows).unwrap_or(Value::Null),
            FieldValue::Relationships(rows) => serde_json::to_value(rows).unwrap_or(Value::Null),
        }
    }
}

fn mismatch(field: Field, value: &Value) -> DomainError {
    DomainError::ValidationError(format!("valor incompatible para '{}' ({:?}): {}", field, field.kind(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_follows_field_kind() {
        let v = FieldValue::from_json(Field::InterdisciplinaryAssociations, json!([])).unwrap();
        assert_eq!(v, FieldValue::Associations(vec![]));
        let v = FieldValue::from_json(Field::OtherThemes, json!([])).unwrap();
        assert_eq!(v, FieldValue::List(vec![]));
    }

    #[test]
    fn null_reads_as_zero_value() {
        let v = FieldValue::from_json(Field::TechnologyDevelopments, Value::Null).unwrap();
        assert_eq!(v, FieldValue::List(vec![]));
    }

    #[test]
    fn rating_above_five_is_rejected() {
        assert!(FieldValue::from_json(Field::Rating, json!(6)).is_err());
        assert_eq!(FieldValue::from_json(Field::Rating, json!(5)).unwrap(), FieldValue::Rating(5));
    }

    #[test]
    fn relationship_keeps_camel_case_key() {
        let rel = TechnologyRelationship { technology_name: "QR Code".into(), ..Default::default() };
        let v = FieldValue::Relationships(vec![rel]).to_json();
        assert_eq!(v[0]["technologyName"], json!("QR Code"));
    }
}
