//! Registro ordenado de pasos del asistente de registro/edición.
//!
//! El orden es significativo: gobierna la navegación y el progreso, no la
//! persistencia. Cada campo pertenece a exactamente un paso.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use saberes_domain::{Field, SpaceFields};

use super::{FormStep, StepStatus};
use crate::errors::CoreError;
use crate::fragment::StepFragment;

pub const ACCESS_OPTIONS: &[&str] = &["Easy location",
                                      "Accessibility",
                                      "Prior scheduling",
                                      "Difficult location",
                                      "Online visit",
                                      "Interdisciplinary class",
                                      "Monitors"];

pub const THEME_OPTIONS: &[&str] = &["Scientific dissemination",
                                     "Local culture",
                                     "Sustainability",
                                     "Interactive technologies",
                                     "Environmental preservation"];

pub const DISCIPLINE_OPTIONS: &[&str] = &["Matemática", "Física", "Química"];

pub const INCLUSION_OPTIONS: &[&str] = &["Architectural accessibility",
                                         "Partial accessibility",
                                         "Audio describer",
                                         "Audio description",
                                         "Libras interpreter",
                                         "Monitor who knows Libras",
                                         "Braille interpreter",
                                         "Hire professional",
                                         "No accessibility resources",
                                         "Staff make the visit accessible",
                                         "Staff do not make the visit accessible"];

#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<FormStep>,
    owner: IndexMap<Field, usize>,
}

impl StepRegistry {
    pub fn new(steps: Vec<FormStep>) -> Self {
        let mut owner = IndexMap::new();
        for (index, step) in steps.iter().enumerate() {
            for field in &step.fields {
                let previous = owner.insert(*field, index);
                debug_assert!(previous.is_none(), "campo '{field}' declarado en más de un paso");
            }
        }
        Self { steps, owner }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[FormStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Result<&FormStep, CoreError> {
        self.steps.get(index).ok_or(CoreError::InvalidStepIndex(index))
    }

    /// Índice del paso dueño de `field`.
    pub fn step_of(&self, field: Field) -> Option<usize> {
        self.owner.get(&field).copied()
    }

    /// Fragmento inicial del paso `index`.
    ///
    /// Sin registro existente devuelve los valores vacíos de cada campo; con
    /// registro, el subconjunto de ese registro que corresponde a la forma
    /// del paso. El resultado ya está normalizado, igual que lo que emiten
    /// los controladores.
    pub fn initial_fragment(&self, index: usize, existing: Option<&SpaceFields>) -> Result<StepFragment, CoreError> {
        let step = self.get(index)?;
        let fragment: StepFragment = step.fields
                                         .iter()
                                         .map(|f| match existing {
                                             Some(record) => (*f, record.get(*f)),
                                             None => (*f, f.kind().zero_value()),
                                         })
                                         .collect();
        Ok(fragment.normalized())
    }

    /// Fragmentos iniciales de todos los pasos, en orden.
    pub fn initial_fragments(&self, existing: Option<&SpaceFields>) -> Vec<StepFragment> {
        (0..self.len()).filter_map(|i| self.initial_fragment(i, existing).ok()).collect()
    }

    /// Estado de cada paso respecto de `current`.
    pub fn progress(&self, current: usize) -> Vec<StepStatus> {
        (0..self.len()).map(|i| match i.cmp(&current) {
                           std::cmp::Ordering::Less => StepStatus::Completed,
                           std::cmp::Ordering::Equal => StepStatus::Current,
                           std::cmp::Ordering::Greater => StepStatus::Pending,
                       })
                       .collect()
    }
}

static SPACE_STEPS: Lazy<Arc<StepRegistry>> = Lazy::new(|| {
    Arc::new(StepRegistry::new(vec![
        FormStep::new("about", "About the Place", &[Field::Name,
                                                    Field::VisitDate,
                                                    Field::Address,
                                                    Field::Contact,
                                                    Field::Email,
                                                    Field::Description,
                                                    Field::MediaUrls,
                                                    Field::Rating])
            .required(&[Field::Name,
                        Field::VisitDate,
                        Field::Address,
                        Field::Contact,
                        Field::Email,
                        Field::Description]),
        FormStep::new("characteristics", "Characteristics", &[Field::AccessTags, Field::ThemeTags])
            .options(Field::AccessTags, ACCESS_OPTIONS)
            .options(Field::ThemeTags, THEME_OPTIONS),
        FormStep::new("interdisciplinarity", "Interdisciplinarity", &[Field::Disciplines,
                                                                      Field::MainTheme,
                                                                      Field::OtherThemes,
                                                                      Field::InterdisciplinaryAssociations,
                                                                      Field::AdditionalInfo])
            .required(&[Field::InterdisciplinaryAssociations])
            .options(Field::Disciplines, DISCIPLINE_OPTIONS),
        FormStep::new("inclusion", "Inclusion & Accessibility", &[Field::InclusionTags, Field::AdditionalInclusion])
            .required(&[Field::InclusionTags])
            .options(Field::InclusionTags, INCLUSION_OPTIONS),
        FormStep::new("technologies", "Technologies", &[Field::DigitalTechnologies,
                                                        Field::DidacticStrategies,
                                                        Field::TechnologyRelationships,
                                                        Field::TechnologyDevelopments]),
        FormStep::new("pedagogical", "Pedagogical Information", &[Field::Contents,
                                                                  Field::Objectives,
                                                                  Field::Methodologies,
                                                                  Field::Evaluations,
                                                                  Field::LearningObjective,
                                                                  Field::GeneralMethodology,
                                                                  Field::SocietyRelationship,
                                                                  Field::TeacherContribution,
                                                                  Field::RecommendedReferences])
            .required(&[Field::Contents,
                        Field::Objectives,
                        Field::Methodologies,
                        Field::Evaluations,
                        Field::LearningObjective,
                        Field::GeneralMethodology,
                        Field::SocietyRelationship,
                        Field::TeacherContribution,
                        Field::RecommendedReferences]),
    ]))
});

/// Registro de los seis pasos del formulario de espacios.
pub fn space_steps() -> Arc<StepRegistry> {
    Arc::clone(&SPACE_STEPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saberes_domain::FieldValue;

    #[test]
    fn every_field_has_exactly_one_owner() {
        let reg = space_steps();
        assert_eq!(reg.len(), 6);
        for field in Field::ALL {
            assert!(reg.step_of(field).is_some(), "{field} sin paso");
        }
        let total: usize = reg.steps().iter().map(|s| s.fields.len()).sum();
        assert_eq!(total, Field::ALL.len());
    }

    #[test]
    fn initial_fragment_uses_existing_subset() {
        let reg = space_steps();
        let mut record = SpaceFields::default();
        record.name = "Museu A".into();
        record.rating = 4;
        record.contents = vec!["x".into()];
        let frag = reg.initial_fragment(0, Some(&record)).unwrap();
        assert_eq!(frag.get(Field::Name), Some(&FieldValue::text("Museu A")));
        assert_eq!(frag.get(Field::Rating), Some(&FieldValue::Rating(4)));
        assert!(!frag.contains(Field::Contents));

        record.contents = vec!["a".into(), " ".into()];
        let frag = reg.initial_fragment(5, Some(&record)).unwrap();
        assert_eq!(frag.get(Field::Contents), Some(&FieldValue::list(["a"])));
    }

    #[test]
    fn initial_fragment_out_of_range() {
        assert_eq!(space_steps().initial_fragment(6, None), Err(CoreError::InvalidStepIndex(6)));
    }

    #[test]
    fn progress_marks_reached_steps() {
        let p = space_steps().progress(2);
        assert_eq!(p[0], StepStatus::Completed);
        assert_eq!(p[2], StepStatus::Current);
        assert_eq!(p[3], StepStatus::Pending);
        assert_eq!(p.iter().filter(|s| s.is_reached()).count(), 3);
    }
}
