use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::{GeneratedImage, ResultEntry, ViewMode};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("favorites io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("favorites json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single named durable value holding the serialized favorites list.
pub trait FavoritesSlot: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>, StoreError>;
    /// Replaces the stored value.
    fn write(&self, value: &str) -> Result<(), StoreError>;
}

pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FavoritesSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, value: &str) -> Result<(), StoreError> {
        // write-then-rename so a crash never leaves a half-written list
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Serializes writes to the slot and remembers the newest revision written.
struct SlotWriter {
    slot: Box<dyn FavoritesSlot>,
    written: Mutex<u64>,
}

/// A favorites list captured after a mutation, written by [`SaveFavorites::commit`].
/// Saves committed out of order never overwrite a newer revision.
#[must_use = "favorites are only persisted once the save is committed"]
pub struct SaveFavorites {
    writer: Arc<SlotWriter>,
    revision: u64,
    json: Result<String, StoreError>,
}

impl SaveFavorites {
    /// Blocking write; call it off the async workers and outside any studio lock.
    pub fn commit(self) {
        let mut written = self.writer.written.lock();
        if *written >= self.revision {
            debug!("⏭️ Skipping favorites revision {}, {} already saved", self.revision, *written);
            return;
        }
        *written = self.revision;
        if let Err(e) = self.json.and_then(|json| self.writer.slot.write(&json)) {
            error!("❌ Failed to save favorites: {}", e);
        }
    }
}

impl std::fmt::Debug for SaveFavorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveFavorites").field("revision", &self.revision).finish()
    }
}

#[derive(Debug)]
pub struct Toggled {
    pub is_favorite: bool,
    pub save: SaveFavorites,
}

/// Session results (newest first) and favorites (newest-favorited first).
pub struct ResultStore {
    session_results: Vec<GeneratedImage>,
    favorites: Vec<GeneratedImage>,
    writer: Arc<SlotWriter>,
    revision: u64,
}

impl ResultStore {
    /// Builds the store and loads any previously saved favorites. Unreadable or
    /// corrupt data leaves favorites empty.
    pub fn load(slot: Box<dyn FavoritesSlot>) -> Self {
        let mut store = Self {
            session_results: Vec::new(),
            favorites: Vec::new(),
            writer: Arc::new(SlotWriter { slot, written: Mutex::new(0) }),
            revision: 0,
        };
        store.load_favorites();
        store
    }

    fn load_favorites(&mut self) {
        let raw = match self.writer.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                error!("❌ Failed to read favorites: {}", e);
                return;
            }
        };
        match serde_json::from_str::<Vec<GeneratedImage>>(&raw) {
            Ok(saved) => {
                let mut seen = HashSet::new();
                let total = saved.len();
                self.favorites = saved.into_iter().filter(|f| seen.insert(f.id.clone())).collect();
                if self.favorites.len() != total {
                    warn!("⚠️ Dropped {} duplicate favorites", total - self.favorites.len());
                }
                info!("⭐ Loaded {} favorites", self.favorites.len());
            }
            Err(e) => error!("❌ Failed to parse favorites: {}", e),
        }
    }

    pub fn session_results(&self) -> &[GeneratedImage] {
        &self.session_results
    }

    pub fn favorites(&self) -> &[GeneratedImage] {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f.id == id)
    }

    pub fn record_result(&mut self, image: GeneratedImage) {
        self.session_results.insert(0, image);
    }

    /// Removes `id` from favorites if present, otherwise favorites a snapshot
    /// found in session results or favorites. Returns the new favorite state and
    /// the save to commit, or `None` when the id is unknown.
    pub fn toggle_favorite(&mut self, id: &str) -> Option<Toggled> {
        let now_favorite = if let Some(pos) = self.favorites.iter().position(|f| f.id == id) {
            self.favorites.remove(pos);
            false
        } else {
            let item = self
                .session_results
                .iter()
                .chain(self.favorites.iter())
                .find(|r| r.id == id)?;
            let snapshot = GeneratedImage { is_favorite: true, ..item.clone() };
            self.favorites.insert(0, snapshot);
            true
        };
        Some(Toggled { is_favorite: now_favorite, save: self.snapshot_favorites() })
    }

    fn snapshot_favorites(&mut self) -> SaveFavorites {
        self.revision += 1;
        SaveFavorites {
            writer: Arc::clone(&self.writer),
            revision: self.revision,
            json: serde_json::to_string(&self.favorites).map_err(StoreError::from),
        }
    }

    pub fn clear_session(&mut self) {
        self.session_results.clear();
    }

    /// The list shown for `view`, each item tagged with its favorite status.
    pub fn entries(&self, view: ViewMode) -> Vec<ResultEntry> {
        let list = match view {
            ViewMode::Results => &self.session_results,
            ViewMode::Favorites => &self.favorites,
        };
        list.iter()
            .map(|image| ResultEntry { favorited: self.is_favorite(&image.id), image: image.clone() })
            .collect()
    }
}
