use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, XFormError};
use crate::spec::control::Control;

/// Top-level form design handed to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Form {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl Form {
    pub fn new(title: impl Into<String>, controls: Vec<Control>) -> Self {
        Self {
            title: title.into(),
            controls,
        }
    }

    /// Reads a form from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(XFormError::Parse)
    }
}
