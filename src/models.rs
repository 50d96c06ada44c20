use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Zh,
}

/// A string carried in both UI languages.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Localized {
    pub en: String,
    pub zh: String,
}

impl Localized {
    pub fn new(en: impl Into<String>, zh: impl Into<String>) -> Self {
        Self { en: en.into(), zh: zh.into() }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Zh => &self.zh,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Gender { Female, Male }

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HairstyleOption {
    pub id: String,
    pub label: Localized,
    pub description: Localized,
    pub prompt: String, // AI-facing fragment, always English
    pub gender: Vec<Gender>,
    pub preview_color: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Preset,
    Custom,
    Reference,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Results,
    Favorites,
}

/// One successful generation. Only `is_favorite` differs between the session
/// copy and the snapshot kept in favorites.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedImage {
    pub id: String,
    pub original_image: String,
    pub generated_image_url: String,
    pub style_id: String,
    pub label: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// A displayed list item: the image plus whether its id is currently in favorites.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResultEntry {
    #[serde(flatten)]
    pub image: GeneratedImage,
    pub favorited: bool,
}

// --- HTTP payloads ---

#[derive(Debug, Deserialize, Clone)]
pub struct ImagePayload {
    pub image: String, // data URI
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReferencePayload {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModePayload { pub mode: GenerationMode }

#[derive(Debug, Deserialize, Clone)]
pub struct StylePayload { pub id: String }

#[derive(Debug, Deserialize, Clone)]
pub struct CustomPromptPayload { pub text: String }

#[derive(Debug, Deserialize, Clone)]
pub struct LanguagePayload { pub language: Language }

#[derive(Debug, Deserialize, Clone)]
pub struct ViewPayload { pub view: ViewMode }

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ToggleResponse {
    pub id: String,
    pub is_favorite: bool,
}
