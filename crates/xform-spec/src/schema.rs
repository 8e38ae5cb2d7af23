use serde_json::Value;

use crate::compile::CompileOptions;
use crate::spec::form::Form;

/// JSON Schema describing the control-tree input format.
pub fn form_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(Form)).unwrap_or(Value::Null)
}

/// JSON Schema describing [`CompileOptions`].
pub fn options_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(CompileOptions)).unwrap_or(Value::Null)
}
