use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::warn;

use xform_spec::{
    CompileOptions, Form, XFormError, check_form, compile, form_schema, options_schema, serialize,
};

const EXAMPLE_FORM: &str = include_str!("../../xform-spec/tests/fixtures/survey.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("{0}")]
    Form(#[from] XFormError),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

/// Host configuration; every field falls back to the compiler defaults.
#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(flatten)]
    options: CompileOptions,
}

fn load_config(config_json: &str) -> Result<ComponentConfig, ComponentError> {
    if config_json.trim().is_empty() {
        return Ok(ComponentConfig::default());
    }
    serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
}

fn load_form(form_json: &str) -> Result<Form, ComponentError> {
    Ok(Form::from_json(form_json)?)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => {
            warn!(error = %err, "request failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "request failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

/// JSON schemas of the control-tree input and the compile configuration.
pub fn describe_schema() -> String {
    respond(Ok(json!({
        "form": form_schema(),
        "config": options_schema(),
    })))
}

/// A sample control tree hosts can offer as a starting point.
pub fn example_form() -> String {
    EXAMPLE_FORM.to_string()
}

/// Structural check without compiling.
pub fn check(form_json: &str) -> String {
    let result = load_form(form_json).and_then(|form| Ok(check_form(&form)?));
    match result {
        Ok(()) => json!({ "valid": true }).to_string(),
        Err(err) => json!({ "valid": false, "error": err.to_string() }).to_string(),
    }
}

/// Compiles the tree and returns XForm XML, or a JSON error envelope.
pub fn compile_xml(config_json: &str, form_json: &str) -> String {
    respond_string(load_config(config_json).and_then(|config| {
        let form = load_form(form_json)?;
        let root = compile(&form, &config.options)?;
        Ok(serialize(&root))
    }))
}

/// Compiles the tree and returns the generic XML tree as JSON.
pub fn compile_tree(config_json: &str, form_json: &str) -> String {
    respond(load_config(config_json).and_then(|config| {
        let form = load_form(form_json)?;
        let root = compile(&form, &config.options)?;
        serde_json::to_value(root).map_err(ComponentError::JsonEncode)
    }))
}
