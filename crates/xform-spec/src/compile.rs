//! Control tree to XForm compilation.
//!
//! The compiler walks the tree depth-first in document order and fills four
//! structures at once: the instance skeleton, the model's `bind` list, the
//! `itext` translations and the body markup. Every itext key placed in the body
//! is registered with [`Translations`] in the same step, so each key exists in
//! every language block.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::{Result, XFormError};
use crate::itext::Translations;
use crate::spec::control::{Branch, Control, Field, Group, NumericKind};
use crate::spec::form::Form;
use crate::spec::text::{Bounds, LocalizedText, SelectOption};
use crate::validate::{check_form, is_xml_name};
use crate::xml::{XmlNode, escape, serialize};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_INSTANCE_ROOT: &str = "data";

const NAMESPACES: [(&str, &str); 5] = [
    ("xmlns", "http://www.w3.org/2002/xforms"),
    ("xmlns:h", "http://www.w3.org/1999/xhtml"),
    ("xmlns:ev", "http://www.w3.org/2001/xml-events"),
    ("xmlns:xsd", "http://www.w3.org/2001/XMLSchema"),
    ("xmlns:jr", "http://openrosa.org/javarosa"),
];

/// How body controls address their instance node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BodyRefs {
    /// `ref="/data/group/field"`, the same path the bind uses.
    #[default]
    Absolute,
    /// `ref="group/field"`, as the legacy builder emitted.
    Relative,
}

/// Settings for a single compile run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CompileOptions {
    /// Active languages; one `translation` block each, in this order.
    pub languages: Vec<String>,
    /// Tag name of the instance root.
    pub instance_root: String,
    /// Optional `id` attribute on the instance root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    pub body_refs: BodyRefs,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            instance_root: DEFAULT_INSTANCE_ROOT.to_string(),
            form_id: None,
            body_refs: BodyRefs::default(),
        }
    }
}

impl CompileOptions {
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_body_refs(mut self, body_refs: BodyRefs) -> Self {
        self.body_refs = body_refs;
        self
    }

    pub fn with_instance_root(mut self, instance_root: impl Into<String>) -> Self {
        self.instance_root = instance_root.into();
        self
    }

    pub fn with_form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = Some(form_id.into());
        self
    }

    fn check(&self) -> Result<()> {
        if self.languages.is_empty() {
            return Err(XFormError::NoLanguages);
        }
        let mut seen = HashSet::new();
        for language in &self.languages {
            if !seen.insert(language.as_str()) {
                return Err(XFormError::DuplicateLanguage(language.clone()));
            }
        }
        if !is_xml_name(&self.instance_root) {
            return Err(XFormError::InvalidInstanceRoot(self.instance_root.clone()));
        }
        Ok(())
    }
}

/// Compiles `form` into the XForm document tree.
#[instrument(skip_all, fields(title = %form.title, languages = options.languages.len()))]
pub fn compile(form: &Form, options: &CompileOptions) -> Result<XmlNode> {
    options.check()?;
    check_form(form)?;

    let mut compiler = Compiler {
        options,
        binds: Vec::new(),
        translations: Translations::new(&options.languages),
    };
    let mut instance = Vec::new();
    let mut body = Vec::new();
    compiler.controls(
        &form.controls,
        &Scope::root(&options.instance_root),
        &mut instance,
        &mut body,
    );

    let Compiler {
        binds,
        translations,
        ..
    } = compiler;
    debug!(
        binds = binds.len(),
        itext = translations.len(),
        "compiled form"
    );

    let mut instance_root = XmlNode::parent(options.instance_root.as_str(), instance);
    if let Some(form_id) = &options.form_id {
        instance_root.attrs.set("id", escape(form_id));
    }

    let mut model = vec![
        XmlNode::parent("instance", vec![instance_root]),
        translations.into_itext(),
    ];
    model.extend(binds);

    let head = XmlNode::parent(
        "h:head",
        vec![
            XmlNode::text("h:title", escape(&form.title)),
            XmlNode::parent("model", model),
        ],
    );

    let mut root = XmlNode::parent("h:html", vec![head, XmlNode::parent("h:body", body)]);
    for (key, value) in NAMESPACES {
        root.attrs.set(key, value);
    }
    Ok(root)
}

/// Compiles `form` and renders the resulting document as text.
pub fn compile_to_string(form: &Form, options: &CompileOptions) -> Result<String> {
    compile(form, options).map(|root| serialize(&root))
}

/// Paths and relevance inherited from the enclosing controls.
#[derive(Debug, Clone)]
struct Scope {
    /// Absolute prefix, e.g. `/data/group/`; used for itext keys and binds.
    xpath: String,
    /// Prefix relative to the instance root, e.g. `group/`.
    relpath: String,
    /// Escaped relevance clauses that every nested control must satisfy.
    relevance: Vec<String>,
}

impl Scope {
    fn root(instance_root: &str) -> Self {
        Self {
            xpath: format!("/{}/", instance_root),
            relpath: String::new(),
            relevance: Vec::new(),
        }
    }

    fn nested(&self, name: &str) -> Self {
        Self {
            xpath: format!("{}{}/", self.xpath, name),
            relpath: format!("{}{}/", self.relpath, name),
            relevance: self.relevance.clone(),
        }
    }

    fn with_conditions(&self, conditions: &[String]) -> Self {
        let mut relevance = self.relevance.clone();
        relevance.extend(
            conditions
                .iter()
                .filter(|condition| !condition.trim().is_empty())
                .map(|condition| escape(condition).into_owned()),
        );
        Self {
            xpath: self.xpath.clone(),
            relpath: self.relpath.clone(),
            relevance,
        }
    }
}

/// What a leaf control contributes beyond its common [`Field`] properties.
struct LeafPlan<'a> {
    field: &'a Field,
    body_tag: &'static str,
    bind_type: Option<&'static str>,
    bounds: Option<Bounds>,
    mediatype: Option<&'static str>,
    options: &'a [SelectOption],
}

impl<'a> LeafPlan<'a> {
    fn plain(field: &'a Field, body_tag: &'static str, bind_type: Option<&'static str>) -> Self {
        Self {
            field,
            body_tag,
            bind_type,
            bounds: None,
            mediatype: None,
            options: &[],
        }
    }
}

struct Compiler<'a> {
    options: &'a CompileOptions,
    binds: Vec<XmlNode>,
    translations: Translations,
}

impl Compiler<'_> {
    fn controls(
        &mut self,
        controls: &[Control],
        scope: &Scope,
        instance: &mut Vec<XmlNode>,
        body: &mut Vec<XmlNode>,
    ) {
        for control in controls {
            trace!(
                kind = control.type_tag(),
                name = control.name().unwrap_or_default(),
                path = %scope.xpath,
                "visiting control"
            );
            let plan = LeafPlan::plain;
            let leaf = match control {
                Control::Group(group) => {
                    self.group(group, scope, instance, body);
                    continue;
                }
                Control::Branch(branch) => {
                    self.branch(branch, scope, instance, body);
                    continue;
                }
                Control::InputText(input) => LeafPlan {
                    bounds: input.length,
                    ..plan(&input.field, "input", Some("string"))
                },
                Control::InputNumeric(input) => {
                    let bind_type = match input.kind {
                        NumericKind::Integer => "int",
                        NumericKind::Decimal => "decimal",
                    };
                    LeafPlan {
                        bounds: input.range,
                        ..plan(&input.field, "input", Some(bind_type))
                    }
                }
                Control::InputDate(field) => plan(field, "input", Some("date")),
                Control::InputLocation(field) => plan(field, "input", Some("geopoint")),
                Control::InputMedia(input) => LeafPlan {
                    mediatype: Some(input.kind.mediatype()),
                    ..plan(&input.field, "upload", Some("binary"))
                },
                Control::InputSelectOne(input) => LeafPlan {
                    options: &input.options,
                    ..plan(&input.field, "select1", None)
                },
                Control::InputSelectMany(input) => LeafPlan {
                    options: &input.options,
                    ..plan(&input.field, "select", None)
                },
            };
            self.leaf(leaf, scope, instance, body);
        }
    }

    fn group(
        &mut self,
        group: &Group,
        scope: &Scope,
        instance: &mut Vec<XmlNode>,
        body: &mut Vec<XmlNode>,
    ) {
        let mut group_instance = Vec::new();
        let mut group_body = Vec::new();

        if let Some(label) = visible(&group.label) {
            let key = format!("{}{}:label", scope.xpath, group.name);
            group_body.push(self.text_ref("label", &key, label));
        }

        self.controls(
            &group.children,
            &scope.nested(&group.name),
            &mut group_instance,
            &mut group_body,
        );

        instance.push(XmlNode::parent(group.name.as_str(), group_instance));
        body.push(XmlNode::parent("group", group_body));
    }

    /// Arms compile in place; each arm's conditions gate only its own controls.
    fn branch(
        &mut self,
        branch: &Branch,
        scope: &Scope,
        instance: &mut Vec<XmlNode>,
        body: &mut Vec<XmlNode>,
    ) {
        for arm in &branch.branches {
            let arm_scope = scope.with_conditions(&arm.conditions);
            self.controls(&arm.children, &arm_scope, instance, body);
        }
    }

    fn leaf(
        &mut self,
        plan: LeafPlan<'_>,
        scope: &Scope,
        instance: &mut Vec<XmlNode>,
        body: &mut Vec<XmlNode>,
    ) {
        let field = plan.field;
        let path = format!("{}{}", scope.xpath, field.name);
        let destination = field
            .destination
            .as_deref()
            .map(|destination| escape(destination).into_owned());

        instance.push(XmlNode::empty(field.name.as_str()));

        let mut bind = XmlNode::empty("bind").attr(
            "nodeset",
            destination.clone().unwrap_or_else(|| path.clone()),
        );
        if let Some(bind_type) = plan.bind_type {
            bind.attrs.set("type", bind_type);
        }
        if field.read_only {
            bind.attrs.set("readonly", "true()");
        }
        if field.required {
            bind.attrs.set("required", "true()");
        }

        let mut relevance = scope.relevance.clone();
        relevance.extend(field.relevance.as_deref().map(escape_clause));
        if let Some(relevant) = conjunction(&relevance) {
            bind.attrs.set("relevant", relevant);
        }

        let mut constraint = Vec::new();
        constraint.extend(plan.bounds.map(bounds_clause));
        constraint.extend(field.constraint.as_deref().map(escape_clause));
        if let Some(constraint) = conjunction(&constraint) {
            bind.attrs.set("constraint", constraint);
        }
        self.binds.push(bind);

        let mut children = Vec::new();
        if let Some(label) = visible(&field.label) {
            children.push(self.text_ref("label", &format!("{}:label", path), label));
        }
        if let Some(hint) = visible(&field.hint) {
            children.push(self.text_ref("hint", &format!("{}:hint", path), hint));
        }
        for (index, option) in plan.options.iter().enumerate() {
            let label = self.text_ref("label", &format!("{}:option{}", path, index), &option.text);
            children.push(XmlNode::parent(
                "item",
                vec![label, XmlNode::text("value", escape(&option.value))],
            ));
        }

        let body_ref = destination.unwrap_or_else(|| match self.options.body_refs {
            BodyRefs::Absolute => path,
            BodyRefs::Relative => format!("{}{}", scope.relpath, field.name),
        });
        let mut tag = XmlNode::parent(plan.body_tag, children).attr("ref", body_ref);
        if let Some(mediatype) = plan.mediatype {
            tag.attrs.set("mediatype", mediatype);
        }
        body.push(tag);
    }

    /// Registers `text` under `key` and returns the body element pointing at it.
    fn text_ref(&mut self, element: &str, key: &str, text: &LocalizedText) -> XmlNode {
        self.translations.register(key, text);
        XmlNode::empty(element).attr("ref", format!("jr:itext('{}')", escape(key)))
    }
}

fn visible(text: &Option<LocalizedText>) -> Option<&LocalizedText> {
    text.as_ref().filter(|text| !text.is_blank())
}

fn escape_clause(expression: &str) -> String {
    escape(expression).into_owned()
}

fn bounds_clause(bounds: Bounds) -> String {
    format!(". &gt; {} and . &lt; {}", bounds.min, bounds.max)
}

/// `(a) and (b) and ...`, or `None` when there are no clauses.
fn conjunction(clauses: &[String]) -> Option<String> {
    if clauses.is_empty() {
        None
    } else {
        Some(format!("({})", clauses.join(") and (")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjunction_parenthesizes_each_clause() {
        assert_eq!(conjunction(&[]), None);
        assert_eq!(conjunction(&["a".into()]), Some("(a)".into()));
        assert_eq!(
            conjunction(&["a".into(), "b or c".into()]),
            Some("(a) and (b or c)".into())
        );
    }

    #[test]
    fn bounds_print_without_trailing_zeroes() {
        assert_eq!(
            bounds_clause(Bounds::new(1.0, 5.5)),
            ". &gt; 1 and . &lt; 5.5"
        );
    }

    #[test]
    fn branch_conditions_extend_scope_relevance() {
        let scope = Scope::root("data").with_conditions(&["/data/age > 18".into(), " ".into()]);
        assert_eq!(scope.relevance, vec!["/data/age &gt; 18".to_string()]);
        assert_eq!(scope.nested("g").relevance, scope.relevance);
    }

    #[test]
    fn options_reject_empty_language_list() {
        let options = CompileOptions::new(Vec::<String>::new());
        assert!(matches!(options.check(), Err(XFormError::NoLanguages)));
    }

    #[test]
    fn options_reject_duplicate_languages() {
        let options = CompileOptions::new(["en", "fr", "en"]);
        assert!(matches!(
            options.check(),
            Err(XFormError::DuplicateLanguage(language)) if language == "en"
        ));
    }

    #[test]
    fn options_reject_bad_instance_root() {
        let options = CompileOptions::default().with_instance_root("my data");
        assert!(matches!(
            options.check(),
            Err(XFormError::InvalidInstanceRoot(_))
        ));
    }
}
