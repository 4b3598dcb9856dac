use saberes_domain::Field;

/// Definición inmutable de un paso del asistente.
///
/// Un paso declara su forma de campos (`fields`), cuáles son obligatorios y,
/// para los campos de etiquetas, el catálogo de opciones seleccionables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStep {
    /// Identificador estable y único dentro del registro.
    pub id: &'static str,
    /// Título mostrado en el progreso.
    pub title: &'static str,
    pub fields: Vec<Field>,
    pub required: Vec<Field>,
    pub options: Vec<(Field, &'static [&'static str])>,
}

impl FormStep {
    pub fn new(id: &'static str, title: &'static str, fields: &[Field]) -> Self {
        Self { id,
               title,
               fields: fields.to_vec(),
               required: Vec::new(),
               options: Vec::new() }
    }

    pub fn required(mut self, fields: &[Field]) -> Self {
        debug_assert!(fields.iter().all(|f| self.fields.contains(f)),
                      "los campos obligatorios deben pertenecer al paso");
        self.required = fields.to_vec();
        self
    }

    pub fn options(mut self, field: Field, catalogue: &'static [&'static str]) -> Self {
        self.options.push((field, catalogue));
        self
    }

    pub fn owns(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_required(&self, field: Field) -> bool {
        self.required.contains(&field)
    }

    /// Catálogo de opciones de un campo de etiquetas, si lo tiene.
    pub fn options_for(&self, field: Field) -> Option<&'static [&'static str]> {
        self.options.iter().find(|(f, _)| *f == field).map(|(_, o)| *o)
    }
}
