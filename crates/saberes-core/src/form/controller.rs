use saberes_domain::{DomainError, Field, FieldKind, FieldValue, InterdisciplinaryAssociation, TechnologyRelationship,
                     MAX_RATING};

use super::validation::{validate_step, FieldError};
use crate::errors::CoreError;
use crate::fragment::StepFragment;
use crate::step::FormStep;

/// Estado editable local de un paso.
///
/// El controlador guarda los valores tal como se editan (`local`, que puede
/// contener filas en blanco a mitad de edición) y emite un fragmento
/// normalizado sólo cuando éste difiere, por valor, del último emitido.
/// Nunca toca el estado de otros pasos.
#[derive(Debug, Clone)]
pub struct StepController {
    index: usize,
    step: FormStep,
    local: StepFragment,
    last_emitted: StepFragment,
    pub(super) uploading: bool,
    pub(super) media_path: Option<String>,
}

impl StepController {
    /// Crea el controlador con el fragmento inicial que el asistente ya
    /// tiene registrado para el paso.
    pub fn new(index: usize, step: FormStep, initial: StepFragment) -> Self {
        Self { index,
               step,
               local: initial.clone(),
               last_emitted: initial,
               uploading: false,
               media_path: None }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step(&self) -> &FormStep {
        &self.step
    }

    /// Valores crudos en edición (pueden incluir entradas en blanco).
    pub fn local(&self) -> &StepFragment {
        &self.local
    }

    /// Fragmento normalizado correspondiente al estado local.
    pub fn fragment(&self) -> StepFragment {
        self.local.normalized()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Errores de validación del estado actual.
    pub fn validate(&self) -> Vec<FieldError> {
        validate_step(&self.step, &self.fragment())
    }

    /// Reemplaza el valor de `field` y emite si el fragmento normalizado
    /// cambió.
    pub fn on_field_change(&mut self, field: Field, value: FieldValue) -> Result<Option<StepFragment>, CoreError> {
        self.check_owned(field)?;
        if !field.kind().accepts(&value) {
            return Err(DomainError::ValidationError(format!("valor incompatible para '{field}': se esperaba {:?}",
                                                            field.kind())).into());
        }
        match &value {
            FieldValue::Rating(r) if *r > MAX_RATING => {
                return Err(DomainError::ValidationError(format!("rating fuera de rango (0..={MAX_RATING}): {r}")).into());
            }
            FieldValue::List(tags) if field.kind() == FieldKind::TagSet => {
                for tag in tags {
                    self.check_option(field, tag)?;
                }
            }
            _ => {}
        }
        self.local.insert(field, value);
        Ok(self.emit())
    }

    /// Marca o desmarca `tag` en un campo de etiquetas.
    pub fn toggle_tag(&mut self, field: Field, tag: &str) -> Result<Option<StepFragment>, CoreError> {
        self.check_owned(field)?;
        self.check_kind(field, &[FieldKind::TagSet])?;
        self.check_option(field, tag)?;
        let mut tags = self.list_of(field);
        match tags.iter().position(|t| t == tag) {
            Some(pos) => {
                tags.remove(pos);
            }
            None => tags.push(tag.to_string()),
        }
        self.local.insert(field, FieldValue::List(tags));
        Ok(self.emit())
    }

    /// Agrega una fila en blanco a una lista. La fila no se emite hasta que
    /// tenga contenido.
    pub fn push_item(&mut self, field: Field) -> Result<Option<StepFragment>, CoreError> {
        self.check_owned(field)?;
        let value = match self.current(field) {
            FieldValue::List(mut items) if field.kind() == FieldKind::TextList => {
                items.push(String::new());
                FieldValue::List(items)
            }
            FieldValue::Associations(mut rows) => {
                rows.push(InterdisciplinaryAssociation::default());
                FieldValue::Associations(rows)
            }
            FieldValue::Relationships(mut rows) => {
                rows.push(TechnologyRelationship::default());
                FieldValue::Relationships(rows)
            }
            _ => return Err(self.kind_error(field)),
        };
        self.local.insert(field, value);
        Ok(self.emit())
    }

    /// Reemplaza el texto de la entrada `index` de una lista de textos.
    pub fn update_item(&mut self, field: Field, index: usize, text: impl Into<String>)
                       -> Result<Option<StepFragment>, CoreError> {
        self.check_owned(field)?;
        self.check_kind(field, &[FieldKind::TextList])?;
        let mut items = self.list_of(field);
        let slot = items.get_mut(index).ok_or(CoreError::ItemOutOfRange { field, index })?;
        *slot = text.into();
        self.local.insert(field, FieldValue::List(items));
        Ok(self.emit())
    }

    /// Elimina la entrada `index` de cualquier campo de lista.
    pub fn remove_item(&mut self, field: Field, index: usize) -> Result<Option<StepFragment>, CoreError> {
        self.check_owned(field)?;
        let out_of_range = CoreError::ItemOutOfRange { field, index };
        let value = match self.current(field) {
            FieldValue::List(mut items) => {
                if index >= items.len() {
                    return Err(out_of_range);
                }
                items.remove(index);
                FieldValue::List(items)
            }
            FieldValue::Associations(mut rows) => {
                if index >= rows.len() {
                    return Err(out_of_range);
                }
                rows.remove(index);
                FieldValue::Associations(rows)
            }
            FieldValue::Relationships(mut rows) => {
                if index >= rows.len() {
                    return Err(out_of_range);
                }
                rows.remove(index);
                FieldValue::Relationships(rows)
            }
            _ => return Err(self.kind_error(field)),
        };
        self.local.insert(field, value);
        Ok(self.emit())
    }

    /// Reemplaza la fila `index` de asociaciones interdisciplinarias.
    pub fn set_association(&mut self, index: usize, row: InterdisciplinaryAssociation)
                           -> Result<Option<StepFragment>, CoreError> {
        let field = Field::InterdisciplinaryAssociations;
        self.check_owned(field)?;
        let mut rows = match self.current(field) {
            FieldValue::Associations(rows) => rows,
            _ => return Err(self.kind_error(field)),
        };
        let slot = rows.get_mut(index).ok_or(CoreError::ItemOutOfRange { field, index })?;
        *slot = row;
        self.local.insert(field, FieldValue::Associations(rows));
        Ok(self.emit())
    }

    /// Reemplaza la fila `index` de relaciones tecnológicas.
    pub fn set_relationship(&mut self, index: usize, row: TechnologyRelationship)
                            -> Result<Option<StepFragment>, CoreError> {
        let field = Field::TechnologyRelationships;
        self.check_owned(field)?;
        let mut rows = match self.current(field) {
            FieldValue::Relationships(rows) => rows,
            _ => return Err(self.kind_error(field)),
        };
        let slot = rows.get_mut(index).ok_or(CoreError::ItemOutOfRange { field, index })?;
        *slot = row;
        self.local.insert(field, FieldValue::Relationships(rows));
        Ok(self.emit())
    }

    /// Emite el fragmento normalizado si cambió respecto del último emitido.
    /// La comparación es por valor.
    pub(super) fn emit(&mut self) -> Option<StepFragment> {
        let fragment = self.local.normalized();
        if fragment == self.last_emitted {
            return None;
        }
        self.last_emitted = fragment.clone();
        Some(fragment)
    }

    /// Adopta valores fusionados desde fuera del controlador para que la
    /// próxima emisión no los pise.
    pub fn absorb(&mut self, fragment: &StepFragment) {
        for (field, value) in fragment.iter() {
            if *field == Field::MediaUrls && self.local.get(*field) != Some(value) {
                self.media_path = None;
            }
            self.local.insert(*field, value.clone());
        }
        self.last_emitted = self.local.normalized();
    }

    pub(super) fn current(&self, field: Field) -> FieldValue {
        self.local.get(field).cloned().unwrap_or_else(|| field.kind().zero_value())
    }

    pub(super) fn set_local(&mut self, field: Field, value: FieldValue) {
        self.local.insert(field, value);
    }

    fn list_of(&self, field: Field) -> Vec<String> {
        match self.current(field) {
            FieldValue::List(items) => items,
            _ => Vec::new(),
        }
    }

    pub(super) fn check_owned(&self, field: Field) -> Result<(), CoreError> {
        if self.step.owns(field) {
            Ok(())
        } else {
            Err(CoreError::FieldNotInStep { field, step: self.index })
        }
    }

    fn check_kind(&self, field: Field, kinds: &[FieldKind]) -> Result<(), CoreError> {
        if kinds.contains(&field.kind()) {
            Ok(())
        } else {
            Err(self.kind_error(field))
        }
    }

    fn check_option(&self, field: Field, tag: &str) -> Result<(), CoreError> {
        match self.step.options_for(field) {
            Some(options) if !options.contains(&tag) => Err(CoreError::UnknownOption { field,
                                                                                      tag: tag.to_string() }),
            _ => Ok(()),
        }
    }

    fn kind_error(&self, field: Field) -> CoreError {
        DomainError::ValidationError(format!("operación no soportada para '{field}' ({:?})", field.kind())).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::space_steps;

    fn controller(index: usize) -> StepController {
        let reg = space_steps();
        StepController::new(index, reg.get(index).unwrap().clone(), reg.initial_fragment(index, None).unwrap())
    }

    #[test]
    fn unchanged_value_is_not_reemitted() {
        let mut c = controller(0);
        assert!(c.on_field_change(Field::Name, FieldValue::text("Museu")).unwrap().is_some());
        assert!(c.on_field_change(Field::Name, FieldValue::text("Museu")).unwrap().is_none());
    }

    #[test]
    fn blank_rows_are_held_locally_but_not_emitted() {
        let mut c = controller(3);
        assert!(c.push_item(Field::AdditionalInclusion).unwrap().is_none());
        assert_eq!(c.local().get(Field::AdditionalInclusion), Some(&FieldValue::list([""])));
        let emitted = c.update_item(Field::AdditionalInclusion, 0, "rampa").unwrap().unwrap();
        assert_eq!(emitted.get(Field::AdditionalInclusion), Some(&FieldValue::list(["rampa"])));
        c.push_item(Field::AdditionalInclusion).unwrap();
        assert_eq!(c.fragment().get(Field::AdditionalInclusion), Some(&FieldValue::list(["rampa"])));
    }

    #[test]
    fn toggle_tag_respects_catalogue() {
        let mut c = controller(1);
        let f = c.toggle_tag(Field::ThemeTags, "Sustainability").unwrap().unwrap();
        assert_eq!(f.get(Field::ThemeTags), Some(&FieldValue::list(["Sustainability"])));
        let f = c.toggle_tag(Field::ThemeTags, "Sustainability").unwrap().unwrap();
        assert_eq!(f.get(Field::ThemeTags), Some(&FieldValue::List(vec![])));
        assert!(matches!(c.toggle_tag(Field::ThemeTags, "Cooking"), Err(CoreError::UnknownOption { .. })));
    }

    #[test]
    fn foreign_field_is_rejected() {
        let mut c = controller(1);
        let err = c.on_field_change(Field::Name, FieldValue::text("x")).unwrap_err();
        assert_eq!(err, CoreError::FieldNotInStep { field: Field::Name, step: 1 });
    }

    #[test]
    fn relationship_without_name_is_pruned() {
        let mut c = controller(4);
        c.push_item(Field::TechnologyRelationships).unwrap();
        let row = TechnologyRelationship { physics: "óptica".into(),
                                           ..Default::default() };
        assert!(c.set_relationship(0, row).unwrap().is_none());
        let row = TechnologyRelationship { technology_name: "Realidade aumentada".into(),
                                           physics: "óptica".into(),
                                           ..Default::default() };
        let f = c.set_relationship(0, row).unwrap().unwrap();
        match f.get(Field::TechnologyRelationships) {
            Some(FieldValue::Relationships(rows)) => assert_eq!(rows.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn remove_item_out_of_range() {
        let mut c = controller(5);
        assert_eq!(c.remove_item(Field::Contents, 0),
                   Err(CoreError::ItemOutOfRange { field: Field::Contents, index: 0 }));
    }
}
