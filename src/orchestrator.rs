use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::catalog::{self, RANDOM_STYLE_ID};
use crate::models::{GeneratedImage, GenerationMode, HairstyleOption, Language, ResultEntry, ToggleResponse, ViewMode};
use crate::provider::{EditRequest, ImageEditor};
use crate::request::{self, Rejected, StyleSelection};
use crate::store::ResultStore;
use crate::upload::EncodedImage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Lifecycle {
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartRejected {
    #[error("no photo uploaded")]
    NoBaseImage,
    #[error("a generation is already in flight")]
    AlreadyInFlight,
    #[error(transparent)]
    Invalid(#[from] Rejected),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Succeeded(GeneratedImage),
    /// Carries the user-facing message, never provider detail.
    Failed(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudioSnapshot {
    pub has_photo: bool,
    pub mode: GenerationMode,
    pub selected_style_id: Option<String>,
    pub style_label: Option<String>,
    pub custom_prompt: String,
    pub has_reference_image: bool,
    pub language: Language,
    pub view: ViewMode,
    pub lifecycle: Lifecycle,
    pub is_generating: bool,
    pub can_generate: bool,
    pub error: Option<String>,
    pub results_count: usize,
    pub favorites_count: usize,
}

struct StudioState {
    base_image: Option<EncodedImage>,
    /// Bumped whenever the base photo is replaced or cleared.
    session_epoch: u64,
    selection: StyleSelection,
    language: Language,
    view: ViewMode,
    lifecycle: Lifecycle,
    error: Option<String>,
    store: ResultStore,
    last_id_ms: i64,
}

impl StudioState {
    fn transition(&mut self, next: Lifecycle) {
        info!("🔁 Lifecycle {:?} -> {:?}", self.lifecycle, next);
        self.lifecycle = next;
    }

    fn start_check(&self) -> Result<(), StartRejected> {
        // a finished flight only returns to Idle once its guard drops
        if self.lifecycle != Lifecycle::Idle {
            return Err(StartRejected::AlreadyInFlight);
        }
        if self.base_image.is_none() {
            return Err(StartRejected::NoBaseImage);
        }
        request::validate(&self.selection)?;
        Ok(())
    }

    /// Millisecond id, bumped past the previous one so ids never repeat.
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let ms = now.timestamp_millis().max(self.last_id_ms + 1);
        self.last_id_ms = ms;
        ms.to_string()
    }

    /// Label for the current choice, as shown next to the style picker.
    fn style_label(&self) -> Option<String> {
        let language = self.language;
        match self.selection.mode {
            GenerationMode::Custom => Some(catalog::custom_label(language).to_string()),
            GenerationMode::Reference => Some(catalog::reference_label(language).to_string()),
            GenerationMode::Preset => match self.selection.selected_style_id.as_deref()? {
                RANDOM_STYLE_ID => Some(match &self.selection.random_style {
                    Some(option) => option.label.get(language).to_string(),
                    None => catalog::random_label(language).to_string(),
                }),
                id => catalog::find_option(id).map(|opt| opt.label.get(language).to_string()),
            },
        }
    }

    fn reset_selection(&mut self) {
        self.selection.selected_style_id = None;
        self.selection.random_style = None;
        self.error = None;
    }
}

/// Owns the editing session: the uploaded photo, the style selection, the
/// single-flight generation lifecycle and the result store.
pub struct Orchestrator {
    state: Arc<Mutex<StudioState>>,
    editor: Arc<dyn ImageEditor>,
}

/// Returns the lifecycle to `Idle` when dropped, whatever happened in between.
struct InFlightGuard {
    state: Arc<Mutex<StudioState>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.lifecycle != Lifecycle::Idle {
            state.transition(Lifecycle::Idle);
        }
    }
}

impl Orchestrator {
    pub fn new(editor: Arc<dyn ImageEditor>, store: ResultStore, language: Language) -> Self {
        Self {
            state: Arc::new(Mutex::new(StudioState {
                base_image: None,
                session_epoch: 0,
                selection: StyleSelection::default(),
                language,
                view: ViewMode::Results,
                lifecycle: Lifecycle::Idle,
                error: None,
                store,
                last_id_ms: 0,
            })),
            editor,
        }
    }

    /// Replaces the base photo and starts a fresh session. Favorites stay.
    pub fn upload_photo(&self, image: EncodedImage) {
        let mut state = self.state.lock();
        state.base_image = Some(image);
        state.session_epoch += 1;
        state.store.clear_session();
        state.reset_selection();
        state.view = ViewMode::Results;
        info!("📷 New photo uploaded, session {}", state.session_epoch);
    }

    /// Drops the photo, the session results and every style input. Favorites stay.
    pub fn clear_photo(&self) {
        let mut state = self.state.lock();
        state.base_image = None;
        state.session_epoch += 1;
        state.store.clear_session();
        state.reset_selection();
        state.selection.custom_prompt.clear();
        state.selection.reference_image = None;
        info!("🧹 Session cleared");
    }

    pub fn set_mode(&self, mode: GenerationMode) {
        self.state.lock().selection.mode = mode;
    }

    pub fn select_style(&self, id: &str) {
        let mut state = self.state.lock();
        state.selection.selected_style_id = Some(id.to_string());
        state.selection.random_style = None;
    }

    /// Synthesizes a random style, pins it for display and selects it.
    pub fn randomize_style(&self) -> HairstyleOption {
        let option = catalog::random_style(&mut rand::thread_rng());
        let mut state = self.state.lock();
        state.selection.selected_style_id = Some(RANDOM_STYLE_ID.to_string());
        state.selection.random_style = Some(option.clone());
        option
    }

    pub fn set_custom_prompt(&self, text: &str) {
        self.state.lock().selection.custom_prompt = text.to_string();
    }

    pub fn set_reference_image(&self, image: Option<EncodedImage>) {
        self.state.lock().selection.reference_image = image;
    }

    pub fn set_language(&self, language: Language) {
        self.state.lock().language = language;
    }

    pub fn set_view(&self, view: ViewMode) {
        self.state.lock().view = view;
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        let state = self.state.lock();
        StudioSnapshot {
            has_photo: state.base_image.is_some(),
            mode: state.selection.mode,
            selected_style_id: state.selection.selected_style_id.clone(),
            style_label: state.style_label(),
            custom_prompt: state.selection.custom_prompt.clone(),
            has_reference_image: state.selection.reference_image.is_some(),
            language: state.language,
            view: state.view,
            lifecycle: state.lifecycle.clone(),
            is_generating: state.lifecycle == Lifecycle::InFlight,
            can_generate: state.start_check().is_ok(),
            error: state.error.clone(),
            results_count: state.store.session_results().len(),
            favorites_count: state.store.favorites().len(),
        }
    }

    /// Entries of the active view, tagged with favorite status.
    pub fn displayed(&self) -> Vec<ResultEntry> {
        let state = self.state.lock();
        state.store.entries(state.view)
    }

    pub fn session_results(&self) -> Vec<GeneratedImage> {
        self.state.lock().store.session_results().to_vec()
    }

    pub fn favorites(&self) -> Vec<GeneratedImage> {
        self.state.lock().store.favorites().to_vec()
    }

    /// Flips favorite status and saves the list once the studio lock is released.
    pub async fn toggle_favorite(&self, id: &str) -> Option<ToggleResponse> {
        let toggled = {
            let mut state = self.state.lock();
            state.store.toggle_favorite(id)
        }?;
        let is_favorite = toggled.is_favorite;
        if let Err(e) = tokio::task::spawn_blocking(move || toggled.save.commit()).await {
            error!("❌ Favorites save task failed: {}", e);
        }
        info!("⭐ {} {}", if is_favorite { "Favorited" } else { "Unfavorited" }, id);
        Some(ToggleResponse { id: id.to_string(), is_favorite })
    }

    /// Runs one generation. Rejected starts change nothing. Provider failures
    /// are logged and reported with the generic message.
    pub async fn generate(&self) -> Result<GenerationOutcome, StartRejected> {
        let (edit, original_image, meta, epoch) = {
            let mut state = self.state.lock();
            if let Err(reason) = state.start_check() {
                warn!("🚫 Generate ignored: {}", reason);
                return Err(reason);
            }
            let base = match state.base_image.clone() {
                Some(base) => base,
                None => return Err(StartRejected::NoBaseImage),
            };
            let request = request::build(&state.selection, state.language, Utc::now(), &mut rand::thread_rng())?;
            if request.style_id == RANDOM_STYLE_ID {
                // a pinned random style is used once
                state.selection.random_style = None;
            }

            state.transition(Lifecycle::InFlight);
            state.error = None;
            state.view = ViewMode::Results;

            let edit = EditRequest {
                base: base.clone(),
                reference: request.reference().cloned(),
                style_description: request.prompt().to_string(),
            };
            let meta = (request.style_id, request.label, request.description);
            (edit, base.to_data_uri(), meta, state.session_epoch)
        };
        let _guard = InFlightGuard { state: Arc::clone(&self.state) };

        info!("🚀 Generating '{}' ({})", meta.1, meta.0);
        let result = self.editor.edit_hairstyle(&edit).await;

        let mut state = self.state.lock();
        match result {
            Ok(generated_image_url) => {
                if state.session_epoch != epoch {
                    warn!("⚠️ Photo changed while generating; keeping the result in the current session");
                }
                let now = Utc::now();
                let (style_id, label, description) = meta;
                let image = GeneratedImage {
                    id: state.next_id(now),
                    original_image,
                    generated_image_url,
                    style_id,
                    label,
                    description,
                    created_at: now,
                    is_favorite: false,
                };
                state.store.record_result(image.clone());
                state.transition(Lifecycle::Succeeded);
                info!("✅ Generation {} recorded", image.id);
                Ok(GenerationOutcome::Succeeded(image))
            }
            Err(e) => {
                error!("❌ Generation failed: {}", e);
                let message = catalog::generic_error(state.language).to_string();
                state.error = Some(message.clone());
                state.transition(Lifecycle::Failed(message.clone()));
                Ok(GenerationOutcome::Failed(message))
            }
        }
        // `state` is released before `_guard` drops and settles the lifecycle to Idle
    }
}
