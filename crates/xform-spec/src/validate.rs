use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, XFormError};
use crate::spec::control::Control;
use crate::spec::form::Form;
use crate::spec::text::Bounds;

static XML_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{Nl}_][\p{L}\p{Nl}\p{Nd}\p{Mn}\p{Mc}\p{Pc}._\-\x{B7}]*$")
        .expect("xml name regex must compile")
});

/// True when `name` can be used as an unprefixed element name.
pub fn is_xml_name(name: &str) -> bool {
    XML_NAME.is_match(name)
}

/// Checks the structure the compiler relies on: every control is named, names
/// are valid XML names, siblings never share a name and bounds are ordered.
///
/// Children of branch arms share the enclosing scope, so they are checked
/// against the branch's siblings and against each other, and positions in
/// error paths count them as members of that scope.
pub fn check_form(form: &Form) -> Result<()> {
    check_scope(&form.controls, "")
}

/// Names seen so far in one scope, and how many members it has.
#[derive(Default)]
struct ScopeState<'a> {
    seen: HashSet<&'a str>,
    members: usize,
}

fn check_scope(controls: &[Control], path: &str) -> Result<()> {
    check_members(controls, path, &mut ScopeState::default())
}

fn check_members<'a>(
    controls: &'a [Control],
    path: &str,
    state: &mut ScopeState<'a>,
) -> Result<()> {
    for control in controls {
        if let Control::Branch(branch) = control {
            for arm in &branch.branches {
                check_members(&arm.children, path, state)?;
            }
            continue;
        }
        let index = state.members;
        state.members += 1;

        let name = control.name().unwrap_or_default();
        if name.trim().is_empty() {
            return Err(XFormError::MissingName {
                path: format!("{}/{}[{}]", path, control.type_tag(), index),
            });
        }
        if !is_xml_name(name) {
            return Err(XFormError::InvalidName {
                path: path_or_root(path),
                name: name.to_string(),
            });
        }
        if !state.seen.insert(name) {
            return Err(XFormError::DuplicateName {
                path: path_or_root(path),
                name: name.to_string(),
            });
        }

        let own_path = format!("{}/{}", path, name);
        match control {
            Control::Group(group) => check_scope(&group.children, &own_path)?,
            Control::InputText(input) => check_bounds(input.length, &own_path)?,
            Control::InputNumeric(input) => check_bounds(input.range, &own_path)?,
            _ => {}
        }
    }
    Ok(())
}

fn check_bounds(bounds: Option<Bounds>, path: &str) -> Result<()> {
    match bounds {
        Some(bounds) if bounds.min > bounds.max => Err(XFormError::InvalidBounds {
            path: path.to_string(),
            min: bounds.min,
            max: bounds.max,
        }),
        _ => Ok(()),
    }
}

fn path_or_root(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
