use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::field::Field;
use crate::value::{FieldValue, InterdisciplinaryAssociation, TechnologyRelationship, MAX_RATING};
use crate::DomainError;

/// Campos de formulario de un espacio, tipados.
///
/// Las listas ausentes o nulas en el JSON se leen como vacías.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceFields {
    pub name: String,
    pub visit_date: String,
    pub address: String,
    pub contact: String,
    pub email: String,
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub media_urls: Vec<String>,
    pub rating: u8,

    #[serde(deserialize_with = "null_as_default")]
    pub access_tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub theme_tags: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub disciplines: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub main_theme: String,
    #[serde(deserialize_with = "null_as_default")]
    pub other_themes: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub interdisciplinary_associations: Vec<InterdisciplinaryAssociation>,
    #[serde(deserialize_with = "null_as_default")]
    pub additional_info: String,

    #[serde(deserialize_with = "null_as_default")]
    pub inclusion_tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub additional_inclusion: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub digital_technologies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub didactic_strategies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub technology_relationships: Vec<TechnologyRelationship>,
    #[serde(deserialize_with = "null_as_default")]
    pub technology_developments: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub contents: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub objectives: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub methodologies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub evaluations: Vec<String>,
    pub learning_objective: String,
    pub general_methodology: String,
    pub society_relationship: String,
    pub teacher_contribution: String,
    pub recommended_references: String,
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
    where D: serde::Deserializer<'de>,
          T: Default + Deserialize<'de>
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

impl SpaceFields {
    /// Valor actual de `field`.
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Name => FieldValue::Text(self.name.clone()),
            Field::VisitDate => FieldValue::Text(self.visit_date.clone()),
            Field::Address => FieldValue::Text(self.address.clone()),
            Field::Contact => FieldValue::Text(self.contact.clone()),
            Field::Email => FieldValue::Text(self.email.clone()),
            Field::Description => FieldValue::Text(self.description.clone()),
            Field::MediaUrls => FieldValue::List(self.media_urls.clone()),
            Field::Rating => FieldValue::Rating(self.rating),
            Field::AccessTags => FieldValue::List(self.access_tags.clone()),
            Field::ThemeTags => FieldValue::List(self.theme_tags.clone()),
            Field::Disciplines => FieldValue::List(self.disciplines.clone()),
            Field::MainTheme => FieldValue::Text(self.main_theme.clone()),
            Field::OtherThemes => FieldValue::List(self.other_themes.clone()),
            Field::InterdisciplinaryAssociations => {
                FieldValue::Associations(self.interdisciplinary_associations.clone())
            }
            Field::AdditionalInfo => FieldValue::Text(self.additional_info.clone()),
            Field::InclusionTags => FieldValue::List(self.inclusion_tags.clone()),
            Field::AdditionalInclusion => FieldValue::List(self.additional_inclusion.clone()),
            Field::DigitalTechnologies => FieldValue::List(self.digital_technologies.clone()),
            Field::DidacticStrategies => FieldValue::List(self.didactic_strategies.clone()),
            Field::TechnologyRelationships => FieldValue::Relationships(self.technology_relationships.clone()),
            Field::TechnologyDevelopments => FieldValue::List(self.technology_developments.clone()),
            Field::Contents => FieldValue::List(self.contents.clone()),
            Field::Objectives => FieldValue::List(self.objectives.clone()),
            Field::Methodologies => FieldValue::List(self.methodologies.clone()),
            Field::Evaluations => FieldValue::List(self.evaluations.clone()),
            Field::LearningObjective => FieldValue::Text(self.learning_objective.clone()),
            Field::GeneralMethodology => FieldValue::Text(self.general_methodology.clone()),
            Field::SocietyRelationship => FieldValue::Text(self.society_relationship.clone()),
            Field::TeacherContribution => FieldValue::Text(self.teacher_contribution.clone()),
            Field::RecommendedReferences => FieldValue::Text(self.recommended_references.clone()),
        }
    }

    /// Asigna `value` a `field`. Falla si el variant no corresponde al tipo
    /// del campo o si la calificación supera el máximo.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), DomainError> {
        if !field.kind().accepts(&value) {
            return Err(DomainError::ValidationError(format!("valor incompatible para '{}': se esperaba {:?}",
                                                            field,
                                                            field.kind())));
        }
        match (field, value) {
            (Field::Rating, FieldValue::Rating(r)) => {
                if r > MAX_RATING {
                    return Err(DomainError::ValidationError(format!("rating fuera de rango (0..={MAX_RATING}): {r}")));
                }
                self.rating = r;
            }
            (Field::InterdisciplinaryAssociations, FieldValue::Associations(rows)) => {
                self.interdisciplinary_associations = rows
            }
            (Field::TechnologyRelationships, FieldValue::Relationships(rows)) => self.technology_relationships = rows,
            (field, FieldValue::Text(s)) => *self.text_slot(field)? = s,
            (field, FieldValue::List(items)) => *self.list_slot(field)? = items,
            (field, other) => {
                return Err(DomainError::ValidationError(format!("valor incompatible para '{field}': {other:?}")))
            }
        }
        Ok(())
    }

    fn text_slot(&mut self, field: Field) -> Result<&mut String, DomainError> {
        Ok(match field {
            Field::Name => &mut self.name,
            Field::VisitDate => &mut self.visit_date,
            Field::Address => &mut self.address,
            Field::Contact => &mut self.contact,
            Field::Email => &mut self.email,
            Field::Description => &mut self.description,
            Field::MainTheme => &mut self.main_theme,
            Field::AdditionalInfo => &mut self.additional_info,
            Field::LearningObjective => &mut self.learning_objective,
            Field::GeneralMethodology => &mut self.general_methodology,
            Field::SocietyRelationship => &mut self.society_relationship,
            Field::TeacherContribution => &mut self.teacher_contribution,
            Field::RecommendedReferences => &mut self.recommended_references,
            other => return Err(DomainError::ValidationError(format!("'{other}' no es un campo de texto"))),
        })
    }

    fn list_slot(&mut self, field: Field) -> Result<&mut Vec<String>, DomainError> {
        Ok(match field {
            Field::MediaUrls => &mut self.media_urls,
            Field::AccessTags => &mut self.access_tags,
            Field::ThemeTags => &mut self.theme_tags,
            Field::Disciplines => &mut self.disciplines,
            Field::OtherThemes => &mut self.other_themes,
            Field::InclusionTags => &mut self.inclusion_tags,
            Field::AdditionalInclusion => &mut self.additional_inclusion,
            Field::DigitalTechnologies => &mut self.digital_technologies,
            Field::DidacticStrategies => &mut self.didactic_strategies,
            Field::TechnologyDevelopments => &mut self.technology_developments,
            Field::Contents => &mut self.contents,
            Field::Objectives => &mut self.objectives,
            Field::Methodologies => &mut self.methodologies,
            Field::Evaluations => &mut self.evaluations,
            other => return Err(DomainError::ValidationError(format!("'{other}' no es un campo de lista"))),
        })
    }
}

/// Registro persistido de un espacio educativo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: SpaceFields,
    #[serde(default)]
    pub review_count: Option<i32>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<space {}: {}>", self.id, self.fields.name)
    }
}

/// Carga útil para insertar un espacio nuevo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSpace {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: SpaceFields,
}
