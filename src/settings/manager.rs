// Settings persistence: JSON file with atomic writes, validation and the API key override

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::browser::proxy::DEFAULT_PROXIES;

/// Environment variable that overrides the stored Gemini API key
pub const API_KEY_ENV: &str = "TABSCRIBE_GEMINI_API_KEY";

/// Placeholder substituted with the transcript in research prompts
pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

/// Main settings structure containing all user preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub obsidian_vault: String,
    #[serde(default)]
    pub obsidian_note: String,
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default = "default_model")]
    pub gemini_model: String,
    #[serde(default)]
    pub enable_youtube_summary: bool,
    #[serde(default = "default_yt_prompt")]
    pub default_yt_prompt: String,
    #[serde(default = "default_proxies")]
    pub proxies: Vec<String>,
}

/// Vault and note path of an Obsidian export, both non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTarget {
    pub vault: String,
    pub note: String,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

pub fn default_yt_prompt() -> String {
    "Please provide a detailed analysis of this YouTube video based on its transcript. Include:\n\
     1. Main topics and key points\n\
     2. Important facts and data mentioned\n\
     3. Notable quotes or statements\n\
     4. Any methodologies or techniques discussed\n\
     5. A critical analysis of the content\n\n\
     {transcript}"
        .to_string()
}

fn default_proxies() -> Vec<String> {
    DEFAULT_PROXIES.iter().map(|p| p.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            obsidian_vault: String::new(),
            obsidian_note: String::new(),
            gemini_api_key: String::new(),
            gemini_model: default_model(),
            enable_youtube_summary: false,
            default_yt_prompt: default_yt_prompt(),
            proxies: default_proxies(),
        }
    }
}

impl Settings {
    /// API key from the environment override, falling back to the stored key
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key_with_override(std::env::var(API_KEY_ENV).ok())
    }

    /// Blank values on either side count as unset
    pub fn api_key_with_override(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| Some(self.gemini_api_key.clone()).filter(|key| !key.trim().is_empty()))
    }

    /// Obsidian vault and note, or None if either is blank
    pub fn note_target(&self) -> Option<NoteTarget> {
        let vault = self.obsidian_vault.trim();
        let note = self.obsidian_note.trim();
        if vault.is_empty() || note.is_empty() {
            return None;
        }
        Some(NoteTarget {
            vault: vault.to_string(),
            note: note.to_string(),
        })
    }

    /// Sets a field by its storage key (the names used in the settings file)
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "obsidian_vault" => self.obsidian_vault = value.to_string(),
            "obsidian_note" => self.obsidian_note = value.to_string(),
            "gemini_api_key" => self.gemini_api_key = value.to_string(),
            "gemini_model" => self.gemini_model = value.to_string(),
            "enable_youtube_summary" => {
                self.enable_youtube_summary = value
                    .parse()
                    .map_err(|_| format!("Expected true or false, got '{}'", value))?
            }
            "default_yt_prompt" => self.default_yt_prompt = value.to_string(),
            "proxies" => {
                self.proxies = value
                    .split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            }
            _ => return Err(format!("Unknown setting '{}'", key)),
        }
        Ok(())
    }
}

/// Manages settings persistence and provides thread-safe access
pub struct SettingsManager {
    settings_path: PathBuf,
    current_settings: Arc<RwLock<Settings>>,
}

impl SettingsManager {
    /// Creates a new SettingsManager and loads settings from ~/.tabscribe/settings.json
    ///
    /// If the settings file doesn't exist, creates it with default values.
    pub fn new() -> Result<Self, String> {
        let home_dir = dirs::home_dir().ok_or_else(|| "Failed to get home directory".to_string())?;

        let settings_path = home_dir.join(".tabscribe").join("settings.json");

        Self::new_with_path(settings_path)
    }

    /// Creates a new SettingsManager with a custom settings path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The settings directory cannot be created
    /// - The settings file cannot be read or written
    pub fn new_with_path(settings_path: PathBuf) -> Result<Self, String> {
        if let Some(parent) = settings_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create settings directory: {}", e))?;
            }
        }

        let manager = Self {
            settings_path: settings_path.clone(),
            current_settings: Arc::new(RwLock::new(Settings::default())),
        };

        let settings = if settings_path.exists() {
            manager.load_from_file()?
        } else {
            let defaults = Settings::default();
            manager.save_to_file(&defaults)?;
            defaults
        };

        *manager
            .current_settings
            .write()
            .map_err(|e| format!("Failed to acquire write lock: {}", e))? = settings;

        Ok(manager)
    }

    /// Returns a clone of the current settings
    pub fn get(&self) -> Settings {
        match self.current_settings.read() {
            Ok(settings) => settings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Updates settings (validates, persists to disk, then updates in-memory)
    ///
    /// In-memory state only changes if the disk write succeeded.
    pub fn update(&self, settings: Settings) -> Result<(), String> {
        Self::validate(&settings)?;

        self.save_to_file(&settings)?;

        *self
            .current_settings
            .write()
            .map_err(|e| format!("Failed to acquire write lock: {}", e))? = settings;

        Ok(())
    }

    /// Validates settings constraints
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - gemini_model is an empty string
    /// - a proxy entry is not an http(s) URL prefix
    fn validate(settings: &Settings) -> Result<(), String> {
        if settings.gemini_model.trim().is_empty() {
            return Err("Gemini model name cannot be empty".to_string());
        }

        if let Some(bad) = settings
            .proxies
            .iter()
            .find(|p| !(p.starts_with("https://") || p.starts_with("http://")))
        {
            return Err(format!("Proxy must start with http:// or https://, got '{}'", bad));
        }

        Ok(())
    }

    /// Loads settings from disk
    ///
    /// If the file contains invalid JSON, logs an error and returns defaults.
    fn load_from_file(&self) -> Result<Settings, String> {
        let contents = std::fs::read_to_string(&self.settings_path)
            .map_err(|e| format!("Failed to read settings file: {}", e))?;

        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!("Failed to parse settings JSON: {}. Using defaults.", e);
                Ok(Settings::default())
            }
        }
    }

    /// Saves settings to disk atomically via a temporary file and rename.
    fn save_to_file(&self, settings: &Settings) -> Result<(), String> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        let temp_path = self.settings_path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)
            .map_err(|e| format!("Failed to write temporary settings file: {}", e))?;

        std::fs::rename(&temp_path, &self.settings_path)
            .map_err(|e| format!("Failed to rename settings file: {}", e))?;

        Ok(())
    }
}
