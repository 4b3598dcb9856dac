//! Validación local por campo. Produce mensajes en línea; la decisión de
//! bloquear la navegación la toma el asistente según `ValidationMode`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use saberes_domain::{Field, FieldValue, MAX_RATING};
use serde::{Deserialize, Serialize};

use crate::fragment::StepFragment;
use crate::step::FormStep;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern"));

/// Error de validación de un campo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self { field,
               message: message.into() }
    }
}

pub fn is_valid_email(s: &str) -> bool {
    EMAIL_PATTERN.is_match(s)
}

fn required_message(field: Field) -> String {
    match field {
        Field::Name => "Place name is required".to_string(),
        Field::VisitDate => "Visit date is required".to_string(),
        Field::Address => "Address is required".to_string(),
        Field::Contact => "Contact is required".to_string(),
        Field::Email => "Email is required".to_string(),
        Field::Description => "Description is required".to_string(),
        other => format!("{other} is required"),
    }
}

/// Valida un fragmento (ya normalizado) contra la forma de su paso.
pub fn validate_step(step: &FormStep, fragment: &StepFragment) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for field in &step.fields {
        let value = fragment.get(*field);
        let empty = value.map(FieldValue::is_empty).unwrap_or(true);
        if empty {
            if step.is_required(*field) {
                errors.push(FieldError::new(*field, required_message(*field)));
            }
            continue;
        }
        if let Some(FieldValue::Rating(r)) = value {
            if *r > MAX_RATING {
                errors.push(FieldError::new(*field, format!("Rating must be between 0 and {MAX_RATING}")));
            }
            continue;
        }
        let text = value.and_then(FieldValue::as_text).unwrap_or_default();
        match field {
            Field::Email if !is_valid_email(text.trim()) => {
                errors.push(FieldError::new(*field, "Invalid email address"));
            }
            Field::VisitDate if NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").is_err() => {
                errors.push(FieldError::new(*field, "Invalid visit date"));
            }
            _ => {}
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::space_steps;

    #[test]
    fn email_pattern_accepts_common_addresses() {
        assert!(is_valid_email("someone@museu.org.br"));
        assert!(is_valid_email("A.B+c@X.IO"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("a@b.c"));
    }

    #[test]
    fn empty_about_step_reports_required_fields() {
        let reg = space_steps();
        let frag = reg.initial_fragment(0, None).unwrap();
        let errors = validate_step(reg.get(0).unwrap(), &frag);
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields,
                   vec![Field::Name,
                        Field::VisitDate,
                        Field::Address,
                        Field::Contact,
                        Field::Email,
                        Field::Description]);
        assert_eq!(errors[0].message, "Place name is required");
    }

    #[test]
    fn malformed_email_and_date() {
        let reg = space_steps();
        let frag = reg.initial_fragment(0, None)
                      .unwrap()
                      .with(Field::Email, FieldValue::text("nope"))
                      .with(Field::VisitDate, FieldValue::text("31/12/2024"));
        let errors = validate_step(reg.get(0).unwrap(), &frag);
        assert!(errors.iter().any(|e| e.field == Field::Email && e.message == "Invalid email address"));
        assert!(errors.iter().any(|e| e.field == Field::VisitDate && e.message == "Invalid visit date"));
    }

    #[test]
    fn out_of_range_rating_is_reported_inline() {
        let reg = space_steps();
        let frag = reg.initial_fragment(0, None).unwrap().with(Field::Rating, FieldValue::Rating(7));
        let errors = validate_step(reg.get(0).unwrap(), &frag);
        assert!(errors.iter().any(|e| e.field == Field::Rating && e.message == "Rating must be between 0 and 5"));

        let frag = reg.initial_fragment(0, None).unwrap().with(Field::Rating, FieldValue::Rating(5));
        assert!(!validate_step(reg.get(0).unwrap(), &frag).iter().any(|e| e.field == Field::Rating));
    }
}
