pub mod control;
pub mod form;
pub mod text;

pub use control::{
    Branch, BranchArm, Control, Field, Group, MediaInput, MediaKind, NumericInput, NumericKind,
    SelectInput, TextInput,
};
pub use form::Form;
pub use text::{Bounds, LocalizedText, SelectOption};
