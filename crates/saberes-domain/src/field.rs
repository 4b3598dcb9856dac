//! Catálogo cerrado de campos de formulario de un espacio.
//!
//! El orden de declaración sigue el orden de los pasos del asistente de
//! registro; `Ord` derivado lo respeta, de modo que los mapas ordenados por
//! `Field` listan los campos en el mismo orden en que se capturan.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;
use crate::DomainError;

/// Tipo de valor que admite un campo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Texto libre de una línea o multilínea.
    Text,
    /// Fecha `YYYY-MM-DD` guardada como texto.
    Date,
    /// Dirección de correo.
    Email,
    /// Calificación 0..=5 (0 = sin calificar).
    Rating,
    /// Lista creciente de textos libres (se podan entradas en blanco).
    TextList,
    /// Conjunto de etiquetas elegidas de un catálogo fijo.
    TagSet,
    /// URLs de medios (a lo sumo una en el diseño actual).
    MediaList,
    /// Filas `{ response, disciplines }`.
    Associations,
    /// Filas `{ technologyName, physics, chemistry, mathematics }`.
    Relationships,
}

impl FieldKind {
    /// Valor vacío para el tipo: cadena vacía, lista vacía o calificación 0.
    pub fn zero_value(self) -> FieldValue {
        match self {
            FieldKind::Text | FieldKind::Date | FieldKind::Email => FieldValue::Text(String::new()),
            FieldKind::Rating => FieldValue::Rating(0),
            FieldKind::TextList | FieldKind::TagSet | FieldKind::MediaList => FieldValue::List(Vec::new()),
            FieldKind::Associations => FieldValue::Associations(Vec::new()),
            FieldKind::Relationships => FieldValue::Relationships(Vec::new()),
        }
    }

    /// `true` si el variant de `value` corresponde a este tipo.
    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!((self, value),
                 (FieldKind::Text | FieldKind::Date | FieldKind::Email, FieldValue::Text(_))
                 | (FieldKind::Rating, FieldValue::Rating(_))
                 | (FieldKind::TextList | FieldKind::TagSet | FieldKind::MediaList, FieldValue::List(_))
                 | (FieldKind::Associations, FieldValue::Associations(_))
                 | (FieldKind::Relationships, FieldValue::Relationships(_)))
    }

    /// Tipos cuyas entradas vacías se eliminan antes de emitir un fragmento.
    pub fn is_list(self) -> bool {
        matches!(self,
                 FieldKind::TextList
                 | FieldKind::TagSet
                 | FieldKind::MediaList
                 | FieldKind::Associations
                 | FieldKind::Relationships)
    }
}

/// Campos de formulario persistidos de un espacio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    // Sobre el lugar
    Name,
    VisitDate,
    Address,
    Contact,
    Email,
    Description,
    MediaUrls,
    Rating,
    // Características
    AccessTags,
    ThemeTags,
    // Interdisciplinaridad
    Disciplines,
    MainTheme,
    OtherThemes,
    InterdisciplinaryAssociations,
    AdditionalInfo,
    // Inclusión y accesibilidad
    InclusionTags,
    AdditionalInclusion,
    // Tecnologías
    DigitalTechnologies,
    DidacticStrategies,
    TechnologyRelationships,
    TechnologyDevelopments,
    // Información pedagógica
    Contents,
    Objectives,
    Methodologies,
    Evaluations,
    LearningObjective,
    GeneralMethodology,
    SocietyRelationship,
    TeacherContribution,
    RecommendedReferences,
}

impl Field {
    /// Todos los campos en orden de captura.
    pub const ALL: [Field; 30] = [Field::Name,
                                  Field::VisitDate,
                                  Field::Address,
                                  Field::Contact,
                                  Field::Email,
                                  Field::Description,
                                  Field::MediaUrls,
                                  Field::Rating,
                                  Field::AccessTags,
                                  Field::ThemeTags,
                                  Field::Disciplines,
                                  Field::MainTheme,
                                  Field::OtherThemes,
                                  Field::InterdisciplinaryAssociations,
                                  Field::AdditionalInfo,
                                  Field::InclusionTags,
                                  Field::AdditionalInclusion,
                                  Field::DigitalTechnologies,
                                  Field::DidacticStrategies,
                                  Field::TechnologyRelationships,
                                  Field::TechnologyDevelopments,
                                  Field::Contents,
                                  Field::Objectives,
                                  Field::Methodologies,
                                  Field::Evaluations,
                                  Field::LearningObjective,
                                  Field::GeneralMethodology,
                                  Field::SocietyRelationship,
                                  Field::TeacherContribution,
                                  Field::RecommendedReferences];

    /// Nombre de columna / clave JSON, estable en el tiempo.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::VisitDate => "visit_date",
            Field::Address => "address",
            Field::Contact => "contact",
            Field::Email => "email",
            Field::Description => "description",
            Field::MediaUrls => "media_urls",
            Field::Rating => "rating",
            Field::AccessTags => "access_tags",
            Field::ThemeTags => "theme_tags",
            Field::Disciplines => "disciplines",
            Field::MainTheme => "main_theme",
            Field::OtherThemes => "other_themes",
            Field::InterdisciplinaryAssociations => "interdisciplinary_associations",
            Field::AdditionalInfo => "additional_info",
            Field::InclusionTags => "inclusion_tags",
            Field::AdditionalInclusion => "additional_inclusion",
            Field::DigitalTechnologies => "digital_technologies",
            Field::DidacticStrategies => "didactic_strategies",
            Field::TechnologyRelationships => "technology_relationships",
            Field::TechnologyDevelopments => "technology_developments",
            Field::Contents => "contents",
            Field::Objectives => "objectives",
            Field::Methodologies => "methodologies",
            Field::Evaluations => "evaluations",
            Field::LearningObjective => "learning_objective",
            Field::GeneralMethodology => "general_methodology",
            Field::SocietyRelationship => "society_relationship",
            Field::TeacherContribution => "teacher_contribution",
            Field::RecommendedReferences => "recommended_references",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::VisitDate => FieldKind::Date,
            Field::Email => FieldKind::Email,
            Field::Rating => FieldKind::Rating,
            Field::MediaUrls => FieldKind::MediaList,
            Field::AccessTags | Field::ThemeTags | Field::Disciplines | Field::InclusionTags => FieldKind::TagSet,
            Field::OtherThemes
            | Field::AdditionalInclusion
            | Field::DigitalTechnologies
            | Field::DidacticStrategies
            | Field::TechnologyDevelopments
            | Field::Contents
            | Field::Objectives
            | Field::Methodologies
            | Field::Evaluations => FieldKind::TextList,
            Field::InterdisciplinaryAssociations => FieldKind::Associations,
            Field::TechnologyRelationships => FieldKind::Relationships,
            Field::Name
            | Field::Address
            | Field::Contact
            | Field::Description
            | Field::MainTheme
            | Field::AdditionalInfo
            | Field::LearningObjective
            | Field::GeneralMethodology
            | Field::SocietyRelationship
            | Field::TeacherContribution
            | Field::RecommendedReferences => FieldKind::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL.iter()
                  .copied()
                  .find(|f| f.as_str() == s)
                  .ok_or_else(|| DomainError::UnknownField(s.to_string()))
    }
}
