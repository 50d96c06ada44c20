use std::path::PathBuf;

use crate::models::Language;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_FAVORITES_PATH: &str = "hairswap_favorites_v1.json";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub port: u16,
    pub favorites_path: PathBuf,
    pub language: Language,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            gemini: GeminiConfig {
                api_key: non_empty("GEMINI_API_KEY"),
                base_url: non_empty("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
            port: non_empty("PORT").and_then(|v| v.parse().ok()).unwrap_or(8080),
            favorites_path: non_empty("HAIRSWAP_FAVORITES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FAVORITES_PATH)),
            language: match non_empty("HAIRSWAP_LANGUAGE").as_deref() {
                Some("en") => Language::En,
                _ => Language::Zh,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.gemini.api_key, None);
        assert_eq!(config.gemini.base_url, DEFAULT_API_BASE);
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
        assert_eq!(config.port, 8080);
        assert_eq!(config.favorites_path, PathBuf::from(DEFAULT_FAVORITES_PATH));
        assert_eq!(config.language, Language::Zh);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = config_from(&[("GEMINI_API_KEY", "   "), ("PORT", "nope")]);
        assert_eq!(config.gemini.api_key, None);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "m"),
            ("PORT", "9000"),
            ("HAIRSWAP_FAVORITES_PATH", "/tmp/favs.json"),
            ("HAIRSWAP_LANGUAGE", "en"),
        ]);
        assert_eq!(config.gemini.api_key.as_deref(), Some("k"));
        assert_eq!(config.gemini.model, "m");
        assert_eq!(config.port, 9000);
        assert_eq!(config.favorites_path, PathBuf::from("/tmp/favs.json"));
        assert_eq!(config.language, Language::En);
    }
}
