use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Display text keyed by language code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for constructing trees in code.
    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(language.into(), text.into());
        self
    }

    /// Text for `language`, or `""` when the dictionary has no entry for it.
    pub fn get(&self, language: &str) -> &str {
        self.0.get(language).map(String::as_str).unwrap_or("")
    }

    /// True when no language carries any text.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|text| text.is_empty())
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(language, text)| (language.into(), text.into()))
                .collect(),
        )
    }
}

/// One choice of a select control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SelectOption {
    #[serde(default)]
    pub text: LocalizedText,
    #[serde(rename = "val", alias = "value")]
    pub value: String,
}

impl SelectOption {
    pub fn new(text: LocalizedText, value: impl Into<String>) -> Self {
        Self {
            text,
            value: value.into(),
        }
    }
}

/// Exclusive numeric bounds used by length and range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Reads an optional string, treating `""` as absent.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

/// Reads optional bounds; the legacy builder wrote `false` for "not set".
pub(crate) fn bounds_or_false<'de, D>(deserializer: D) -> Result<Option<Bounds>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Bounds(Bounds),
        Flag(bool),
        Plain(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Bounds(bounds)) => Ok(Some(bounds)),
        Some(Repr::Flag(false)) | None => Ok(None),
        Some(Repr::Plain(plain)) if plain.trim().is_empty() => Ok(None),
        Some(Repr::Flag(true)) | Some(Repr::Plain(_)) => Err(serde::de::Error::custom(
            "bounds must be an object with min and max, or false",
        )),
    }
}

/// Reads a value that falls back to its default when absent, null or `""`.
pub(crate) fn empty_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr<T> {
        Value(T),
        Plain(String),
    }

    match Option::<Repr<T>>::deserialize(deserializer)? {
        Some(Repr::Value(value)) => Ok(value),
        Some(Repr::Plain(plain)) if plain.trim().is_empty() => Ok(T::default()),
        Some(Repr::Plain(plain)) => Err(serde::de::Error::custom(format!(
            "unexpected value '{}'",
            plain
        ))),
        None => Ok(T::default()),
    }
}

/// Reads optional localized text; a bare empty string counts as absent.
pub(crate) fn text_or_empty<'de, D>(deserializer: D) -> Result<Option<LocalizedText>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(LocalizedText),
        Plain(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Text(text)) if !text.is_blank() => Ok(Some(text)),
        Some(Repr::Text(_)) | None => Ok(None),
        Some(Repr::Plain(plain)) if plain.is_empty() => Ok(None),
        Some(Repr::Plain(_)) => Err(serde::de::Error::custom(
            "localized text must be an object keyed by language code",
        )),
    }
}
