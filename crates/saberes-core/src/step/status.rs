/// Estado de un paso respecto de la posición actual del asistente.
///
/// Se deriva de `current_step`; no se persiste:
/// - `Completed`: índice menor que el actual.
/// - `Current`: el paso visible.
/// - `Pending`: todavía no alcanzado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// El paso ya fue superado.
    Completed,
    /// El paso está en pantalla.
    Current,
    /// El paso aún no fue alcanzado.
    Pending,
}

impl StepStatus {
    /// Un paso está "alcanzado" si es el actual o uno anterior.
    pub fn is_reached(self) -> bool {
        !matches!(self, StepStatus::Pending)
    }
}
