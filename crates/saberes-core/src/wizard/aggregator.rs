//! Agregador del asistente de registro/edición.

use std::fmt;
use std::sync::Arc;

use saberes_domain::{Field, FieldValue, NewSpace, Space, SpaceFields};
use uuid::Uuid;

use super::{PreviewRevoker, WizardBuilder, WizardConfig};
use crate::constants::PREVIEW_URL_SCHEME;
use crate::errors::CoreError;
use crate::form::{validate_step, FieldError, StepController};
use crate::fragment::{merge_all, merge_fragment, DraftRecord, StepFragment};
use crate::gateway::{ObjectStorage, PersistenceGateway};
use crate::identity::Actor;
use crate::step::{space_steps, StepRegistry, StepStatus};

/// Registro nuevo o edición de un espacio existente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Register,
    Edit { id: Uuid },
}

/// Asistente multipaso.
///
/// Es dueño exclusivo de los fragmentos de todos los pasos. El borrador se
/// recalcula desde `fragments` cada vez que se pide, nunca se guarda aparte.
/// El gateway se inyecta; el asistente no conoce credenciales ni clientes
/// globales.
pub struct Wizard<G: PersistenceGateway> {
    gateway: G,
    registry: Arc<StepRegistry>,
    mode: WizardMode,
    config: WizardConfig,
    current_step: usize,
    fragments: Vec<StepFragment>,
    controllers: Vec<StepController>,
    pristine: DraftRecord,
    revoker: Option<Box<dyn PreviewRevoker>>,
    completed: bool,
}

impl<G: PersistenceGateway> Wizard<G> {
    /// Asistente de registro con los seis pasos del formulario de espacios.
    pub fn register(gateway: G) -> Self {
        Self::builder(gateway).build()
    }

    /// Asistente de edición hidratado desde `space`.
    pub fn edit(gateway: G, space: &Space) -> Self {
        Self::builder(gateway).editing(space).build()
    }

    /// Carga el espacio `id` desde el gateway y abre la edición.
    pub fn load(gateway: G, id: Uuid) -> Result<Self, CoreError> {
        let space = gateway.select_by_id(id).map_err(CoreError::persistence)?.ok_or(CoreError::NotFound(id))?;
        Ok(Self::edit(gateway, &space))
    }

    pub fn builder(gateway: G) -> WizardBuilder<G> {
        WizardBuilder::new(gateway)
    }

    pub(super) fn from_parts(gateway: G,
                             registry: Option<Arc<StepRegistry>>,
                             config: WizardConfig,
                             revoker: Option<Box<dyn PreviewRevoker>>,
                             existing: Option<(Uuid, SpaceFields)>)
                             -> Self {
        let registry = registry.unwrap_or_else(space_steps);
        let (mode, record) = match existing {
            Some((id, fields)) => (WizardMode::Edit { id }, Some(fields)),
            None => (WizardMode::Register, None),
        };
        let fragments = registry.initial_fragments(record.as_ref());
        let controllers = registry.steps()
                                  .iter()
                                  .zip(&fragments)
                                  .enumerate()
                                  .map(|(i, (step, frag))| StepController::new(i, step.clone(), frag.clone()))
                                  .collect();
        let pristine = merge_all(&fragments);
        log::debug!("asistente montado en modo {mode:?} con {} pasos", registry.len());
        Self { gateway,
               registry,
               mode,
               config,
               current_step: 0,
               fragments,
               controllers,
               pristine,
               revoker,
               completed: false }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 >= self.step_count()
    }

    pub fn progress(&self) -> Vec<StepStatus> {
        self.registry.progress(self.current_step)
    }

    /// Pasa al siguiente paso; en el último no hace nada. Con validación
    /// bloqueante falla si el paso actual tiene errores.
    pub fn advance(&mut self) -> Result<usize, CoreError> {
        if self.config.is_blocking() {
            let errors = self.step_errors(self.current_step);
            if !errors.is_empty() {
                return Err(CoreError::Validation(errors));
            }
        }
        if self.current_step + 1 < self.step_count() {
            self.current_step += 1;
        }
        Ok(self.current_step)
    }

    /// Vuelve al paso anterior; en el primero no hace nada.
    pub fn retreat(&mut self) -> usize {
        self.current_step = self.current_step.saturating_sub(1);
        self.current_step
    }

    /// Salta directamente a `index` (pestañas de la página de edición),
    /// acotado al rango de pasos.
    pub fn go_to(&mut self, index: usize) -> usize {
        self.current_step = index.min(self.step_count().saturating_sub(1));
        self.current_step
    }

    /// Fusiona `fragment` sobre el fragmento registrado del paso `index` y
    /// lo comunica al controlador del paso.
    pub fn receive_fragment(&mut self, index: usize, fragment: StepFragment) -> Result<(), CoreError> {
        let fragment = self.merge_into(index, fragment)?;
        if let Some(controller) = self.controllers.get_mut(index) {
            controller.absorb(&fragment);
        }
        Ok(())
    }

    fn merge_into(&mut self, index: usize, fragment: StepFragment) -> Result<StepFragment, CoreError> {
        let step = self.registry.get(index)?;
        if let Some(field) = fragment.fields().find(|f| !step.owns(*f)) {
            return Err(CoreError::FieldNotInStep { field, step: index });
        }
        let fragment = fragment.normalized();
        let slot = &mut self.fragments[index];
        *slot = merge_fragment(slot, &fragment);
        Ok(fragment)
    }

    pub fn fragments(&self) -> &[StepFragment] {
        &self.fragments
    }

    pub fn controller(&self, index: usize) -> Option<&StepController> {
        self.controllers.get(index)
    }

    /// Aplica una edición al controlador de `index` y fusiona lo que emita
    /// en el mismo turno. Devuelve `true` si hubo fusión.
    pub fn edit_step<F>(&mut self, index: usize, edit: F) -> Result<bool, CoreError>
        where F: FnOnce(&mut StepController) -> Result<Option<StepFragment>, CoreError>
    {
        let controller = self.controllers.get_mut(index).ok_or(CoreError::InvalidStepIndex(index))?;
        match edit(controller)? {
            Some(fragment) => {
                // Lo emitido ya refleja el estado local del controlador.
                self.merge_into(index, fragment)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enruta el cambio al paso dueño de `field`.
    pub fn on_field_change(&mut self, field: Field, value: FieldValue) -> Result<bool, CoreError> {
        let index = self.owner_of(field)?;
        self.edit_step(index, |c| c.on_field_change(field, value))
    }

    pub fn toggle_tag(&mut self, field: Field, tag: &str) -> Result<bool, CoreError> {
        let index = self.owner_of(field)?;
        self.edit_step(index, |c| c.toggle_tag(field, tag))
    }

    /// Sube un medio al paso dueño de `media_urls`.
    pub fn attach_media(&mut self, storage: &mut dyn ObjectStorage, actor: Option<&Actor>, file_name: &str,
                        bytes: &[u8])
                        -> Result<bool, CoreError> {
        let index = self.owner_of(Field::MediaUrls)?;
        self.edit_step(index, |c| c.attach_media(storage, actor, file_name, bytes))
    }

    pub fn detach_media(&mut self, storage: &mut dyn ObjectStorage, actor: Option<&Actor>)
                        -> Result<bool, CoreError> {
        let index = self.owner_of(Field::MediaUrls)?;
        self.edit_step(index, |c| c.detach_media(storage, actor))
    }

    /// Borrador fusionado, calculado bajo demanda.
    pub fn draft(&self) -> DraftRecord {
        merge_all(&self.fragments)
    }

    pub fn pristine(&self) -> &DraftRecord {
        &self.pristine
    }

    /// Igualdad estructural entre el borrador y la instantánea inicial.
    pub fn is_dirty(&self) -> bool {
        self.draft() != self.pristine
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Errores del paso `index` según su fragmento registrado.
    pub fn step_errors(&self, index: usize) -> Vec<FieldError> {
        match (self.registry.get(index), self.fragments.get(index)) {
            (Ok(step), Some(fragment)) => validate_step(step, fragment),
            _ => Vec::new(),
        }
    }

    pub fn validation_errors(&self) -> Vec<FieldError> {
        (0..self.step_count()).flat_map(|i| self.step_errors(i)).collect()
    }

    /// Envía el borrador. Sólo disponible en el último paso.
    ///
    /// Sin actor no se toca el gateway. Si el gateway falla, los fragmentos
    /// quedan intactos para reintentar y el mensaje se devuelve tal cual.
    pub fn submit(&mut self, actor: Option<&Actor>) -> Result<Space, CoreError> {
        if !self.is_last_step() {
            return Err(CoreError::NotAtLastStep);
        }
        self.persist(actor)
    }

    /// Guarda los cambios de una edición desde cualquier paso.
    pub fn save_changes(&mut self, actor: Option<&Actor>) -> Result<Space, CoreError> {
        if !matches!(self.mode, WizardMode::Edit { .. }) {
            return Err(CoreError::NotEditing);
        }
        self.persist(actor)
    }

    fn persist(&mut self, actor: Option<&Actor>) -> Result<Space, CoreError> {
        let actor = actor.ok_or(CoreError::Unauthenticated)?;
        if !actor.can_manage_spaces() {
            return Err(CoreError::Forbidden);
        }
        if self.config.is_blocking() {
            let errors = self.validation_errors();
            if !errors.is_empty() {
                return Err(CoreError::Validation(errors));
            }
        }
        let draft = self.draft();
        let result = match self.mode {
            WizardMode::Register => {
                let record = NewSpace { user_id: actor.id,
                                        fields: draft.to_fields()? };
                self.gateway.insert(record)
            }
            WizardMode::Edit { id } => self.gateway.update(id, &draft),
        };
        let space = match result {
            Ok(space) => space,
            Err(e) => {
                log::error!("fallo al guardar el espacio: {e}");
                return Err(CoreError::persistence(e));
            }
        };
        self.release_previews(&draft);
        log::debug!("espacio {} guardado ({:?})", space.id, self.mode);
        self.pristine = draft;
        self.mode = WizardMode::Edit { id: space.id };
        self.completed = true;
        Ok(space)
    }

    fn release_previews(&mut self, draft: &DraftRecord) {
        let Some(revoker) = self.revoker.as_mut() else {
            return;
        };
        for url in draft.media_urls().iter().filter(|u| u.starts_with(PREVIEW_URL_SCHEME)) {
            revoker.revoke(url);
        }
    }

    fn owner_of(&self, field: Field) -> Result<usize, CoreError> {
        self.registry
            .step_of(field)
            .ok_or(CoreError::FieldNotInStep { field,
                                               step: self.current_step })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }
}

impl<G: PersistenceGateway + fmt::Debug> fmt::Debug for Wizard<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
         .field("gateway", &self.gateway)
         .field("mode", &self.mode)
         .field("config", &self.config)
         .field("current_step", &self.current_step)
         .field("fragments", &self.fragments)
         .field("completed", &self.completed)
         .finish_non_exhaustive()
    }
}
