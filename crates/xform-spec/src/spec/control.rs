use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::text::{
    Bounds, LocalizedText, SelectOption, bounds_or_false, empty_as_default, empty_as_none,
    text_or_empty,
};

/// A node of the control tree, discriminated by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Control {
    Group(Group),
    Branch(Branch),
    InputText(TextInput),
    InputNumeric(NumericInput),
    InputDate(Field),
    InputLocation(Field),
    InputMedia(MediaInput),
    InputSelectOne(SelectInput),
    InputSelectMany(SelectInput),
}

impl Control {
    /// The `type` tag this control is written with.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Control::Group(_) => "group",
            Control::Branch(_) => "branch",
            Control::InputText(_) => "inputText",
            Control::InputNumeric(_) => "inputNumeric",
            Control::InputDate(_) => "inputDate",
            Control::InputLocation(_) => "inputLocation",
            Control::InputMedia(_) => "inputMedia",
            Control::InputSelectOne(_) => "inputSelectOne",
            Control::InputSelectMany(_) => "inputSelectMany",
        }
    }

    /// Name of the control; unnamed branches return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Control::Group(group) => Some(&group.name),
            Control::Branch(branch) => branch.name.as_deref(),
            other => other.field().map(|field| field.name.as_str()),
        }
    }

    /// Common leaf properties; `None` for groups and branches.
    pub fn field(&self) -> Option<&Field> {
        match self {
            Control::Group(_) | Control::Branch(_) => None,
            Control::InputText(input) => Some(&input.field),
            Control::InputNumeric(input) => Some(&input.field),
            Control::InputDate(field) | Control::InputLocation(field) => Some(field),
            Control::InputMedia(input) => Some(&input.field),
            Control::InputSelectOne(input) | Control::InputSelectMany(input) => Some(&input.field),
        }
    }
}

/// Properties shared by every leaf control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(
        default,
        alias = "Label",
        deserialize_with = "text_or_empty",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<LocalizedText>")]
    pub label: Option<LocalizedText>,
    #[serde(
        default,
        alias = "Hint",
        deserialize_with = "text_or_empty",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<LocalizedText>")]
    pub hint: Option<LocalizedText>,
    #[serde(default, alias = "Required", deserialize_with = "empty_as_default")]
    #[schemars(with = "bool")]
    pub required: bool,
    #[serde(default, alias = "Read Only", deserialize_with = "empty_as_default")]
    #[schemars(with = "bool")]
    pub read_only: bool,
    /// XPath expression gating whether the control is shown.
    #[serde(
        default,
        alias = "Relevance",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub relevance: Option<String>,
    /// XPath expression the answer must satisfy.
    #[serde(
        default,
        alias = "Constraint",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub constraint: Option<String>,
    /// Explicit instance path overriding the default `/data/...` location.
    #[serde(
        default,
        alias = "Instance Destination",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub destination: Option<String>,
}

impl Field {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextInput {
    #[serde(flatten)]
    pub field: Field,
    #[serde(
        default,
        alias = "Length",
        deserialize_with = "bounds_or_false",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Bounds>")]
    pub length: Option<Bounds>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NumericKind {
    #[default]
    Integer,
    Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NumericInput {
    #[serde(flatten)]
    pub field: Field,
    #[serde(default, alias = "Kind", deserialize_with = "empty_as_default")]
    #[schemars(with = "NumericKind")]
    pub kind: NumericKind,
    #[serde(
        default,
        alias = "Range",
        deserialize_with = "bounds_or_false",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Bounds>")]
    pub range: Option<Bounds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    /// MIME wildcard accepted by the upload widget, e.g. `image/*`.
    pub fn mediatype(self) -> &'static str {
        match self {
            MediaKind::Image => "image/*",
            MediaKind::Audio => "audio/*",
            MediaKind::Video => "video/*",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MediaInput {
    #[serde(flatten)]
    pub field: Field,
    #[serde(alias = "Kind")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SelectInput {
    #[serde(flatten)]
    pub field: Field,
    #[serde(
        default,
        alias = "Options",
        deserialize_with = "empty_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    #[schemars(with = "Vec<SelectOption>")]
    pub options: Vec<SelectOption>,
}

/// Structural grouping; contributes a nested instance node and a body `group`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Group {
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(
        default,
        alias = "Label",
        deserialize_with = "text_or_empty",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<LocalizedText>")]
    pub label: Option<LocalizedText>,
    #[serde(default)]
    pub children: Vec<Control>,
}

/// Conditional sections whose controls live in the enclosing scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Branch {
    #[serde(
        default,
        alias = "Name",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub name: Option<String>,
    #[serde(default)]
    pub branches: Vec<BranchArm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BranchArm {
    /// XPath expressions that must all hold for the arm's controls to be relevant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub children: Vec<Control>,
}
