use std::collections::BTreeMap;

use saberes_domain::{DomainError, Field, FieldValue, SpaceFields};
use serde::Serialize;

/// Subconjunto de campos de un registro propiedad de un paso.
///
/// Las claves son únicas dentro del paso. La igualdad es estructural sobre
/// los valores tipados; el orden de inserción no influye.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepFragment {
    values: BTreeMap<Field, FieldValue>,
}

impl StepFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        self.values.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: Field, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(field, value)
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &FieldValue)> {
        self.values.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copia con las entradas en blanco de los campos de lista eliminadas.
    pub fn normalized(&self) -> StepFragment {
        let values = self.values
                         .iter()
                         .map(|(f, v)| (*f, if f.kind().is_list() { v.pruned() } else { v.clone() }))
                         .collect();
        StepFragment { values }
    }
}

impl FromIterator<(Field, FieldValue)> for StepFragment {
    fn from_iter<T: IntoIterator<Item = (Field, FieldValue)>>(iter: T) -> Self {
        StepFragment { values: iter.into_iter().collect() }
    }
}

/// Registro candidato a enviarse: unión de los fragmentos de todos los
/// pasos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftRecord {
    values: BTreeMap<Field, FieldValue>,
}

impl DraftRecord {
    pub fn insert(&mut self, field: Field, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(field, value)
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &FieldValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Campos cuyo valor difiere entre `self` y `other` (incluye claves
    /// presentes en uno solo).
    pub fn changed_fields(&self, other: &DraftRecord) -> Vec<Field> {
        Field::ALL.iter()
                  .copied()
                  .filter(|f| self.values.get(f) != other.values.get(f))
                  .collect()
    }

    /// URLs de medios del borrador (vacío si el campo no está presente).
    pub fn media_urls(&self) -> &[String] {
        self.get(Field::MediaUrls).and_then(FieldValue::as_list).unwrap_or(&[])
    }

    /// Proyección tipada. Los campos ausentes quedan en su valor vacío.
    pub fn to_fields(&self) -> Result<SpaceFields, DomainError> {
        let mut fields = SpaceFields::default();
        self.apply_to(&mut fields)?;
        Ok(fields)
    }

    /// Aplica cada campo presente sobre `fields` (merge shallow).
    pub fn apply_to(&self, fields: &mut SpaceFields) -> Result<(), DomainError> {
        for (field, value) in &self.values {
            fields.set(*field, value.clone())?;
        }
        Ok(())
    }

    /// Borrador completo (los 30 campos) a partir de un registro tipado.
    pub fn from_fields(fields: &SpaceFields) -> DraftRecord {
        DraftRecord { values: Field::ALL.iter().map(|f| (*f, fields.get(*f))).collect() }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> =
            self.values.iter().map(|(f, v)| (f.as_str().to_string(), v.to_json())).collect();
        serde_json::Value::Object(map)
    }
}
