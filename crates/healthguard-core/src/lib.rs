pub mod catalog;

pub use catalog::{Gender, Symptom, SymptomId, GENDERS, SYMPTOMS};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAX_AGE: u32 = 120;

// --- Errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Pilih minimal satu gejala")]
    NoSymptoms,
    #[error("Usia {0} di luar rentang 0 sampai 120")]
    AgeOutOfRange(u32),
    #[error("Gejala tidak dikenal: {0}")]
    UnknownSymptom(String),
    #[error("Jenis kelamin tidak dikenal: {0}")]
    UnknownGender(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

// --- Request ---

/// One form submission. Only constructible through [`DiagnosisRequest::new`],
/// so a value of this type always holds at least one symptom and a valid age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosisRequest {
    symptoms: Vec<SymptomId>,
    age: u32,
    gender: Gender,
}

impl DiagnosisRequest {
    /// Duplicate symptoms are dropped; the first occurrence keeps its position.
    pub fn new(
        symptoms: impl IntoIterator<Item = SymptomId>,
        age: u32,
        gender: Gender,
    ) -> Result<Self, RequestError> {
        let mut unique: Vec<SymptomId> = Vec::new();
        for s in symptoms {
            if !unique.contains(&s) {
                unique.push(s);
            }
        }
        if unique.is_empty() {
            return Err(RequestError::NoSymptoms);
        }
        if age > MAX_AGE {
            return Err(RequestError::AgeOutOfRange(age));
        }
        Ok(Self {
            symptoms: unique,
            age,
            gender,
        })
    }

    pub fn symptoms(&self) -> &[SymptomId] {
        &self.symptoms
    }

    pub fn symptom_names(&self) -> Vec<&'static str> {
        self.symptoms.iter().map(|s| s.display_name()).collect()
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }
}

// --- Result ---
//
// Every field is optional: the model is only asked for this shape, nothing
// guarantees it. Renderers must cope with any field being absent.
//
// Text fields take any JSON scalar (a numeric probability is rendered as
// text). Lists must be arrays, but their items are read the same way.

/// Text of a scalar model value. `null` counts as absent.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

fn lenient_text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(items.map(|v| v.into_iter().filter_map(scalar_text).collect()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_conditions: Option<Vec<PossibleCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Recommendations>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub seek_medical_attention: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub preventive_measures: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PossibleCondition {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// "Tinggi", "Sedang" or "Rendah" when the model follows instructions.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub probability: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    #[serde(
        default,
        deserialize_with = "lenient_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub immediate: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub lifestyle: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub medications: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Soon,
    Emergency,
}

impl DiagnosisResult {
    /// Classify the free-text urgency level. Unrecognised or missing levels
    /// are treated as normal.
    pub fn urgency(&self) -> Urgency {
        match self.urgency_level.as_deref().map(str::trim) {
            Some("Darurat") => Urgency::Emergency,
            Some("Segera") => Urgency::Soon,
            _ => Urgency::Normal,
        }
    }
}

// --- AI Settings ---

pub const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AiSettings {
    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production; tests pass a map.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("HEALTHGUARD_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = get("HEALTHGUARD_MODEL") {
            self.model = model;
        }
        if let Some(key) = get("HEALTHGUARD_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
            self.api_key = key;
        }
        self
    }
}

/// Resolve the config directory (~/.healthguard/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".healthguard")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Stored settings with environment overrides applied.
pub fn read_settings() -> AiSettings {
    read_settings_from(&settings_path()).with_env_overrides(|k| std::env::var(k).ok())
}

/// Missing or unreadable files yield defaults.
pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_settings(settings: &AiSettings) -> Result<(), SettingsError> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &Path, settings: &AiSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.trim().is_empty())
}
