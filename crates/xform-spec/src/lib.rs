#![allow(missing_docs)]

pub mod compile;
pub mod error;
pub mod itext;
pub mod schema;
pub mod spec;
pub mod validate;
pub mod xml;

pub use compile::{BodyRefs, CompileOptions, compile, compile_to_string};
pub use error::{Result, XFormError};
pub use itext::Translations;
pub use schema::{form_schema, options_schema};
pub use spec::{
    Bounds, Branch, BranchArm, Control, Field, Form, Group, LocalizedText, MediaInput, MediaKind,
    NumericInput, NumericKind, SelectInput, SelectOption, TextInput,
};
pub use validate::check_form;
pub use xml::{XmlContent, XmlNode, escape, serialize};
