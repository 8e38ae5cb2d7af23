use std::collections::BTreeSet;

use crate::spec::text::LocalizedText;
use crate::xml::{XmlNode, escape};

/// Per-language `itext` blocks filled in lockstep while a form compiles.
#[derive(Debug, Clone)]
pub struct Translations {
    languages: Vec<String>,
    blocks: Vec<Vec<XmlNode>>,
    keys: BTreeSet<String>,
}

impl Translations {
    pub fn new(languages: &[String]) -> Self {
        Self {
            languages: languages.to_vec(),
            blocks: vec![Vec::new(); languages.len()],
            keys: BTreeSet::new(),
        }
    }

    /// Appends one `text` entry for `path` to every language block. Languages
    /// missing from `text` get an empty value.
    pub fn register(&mut self, path: &str, text: &LocalizedText) {
        for (language, block) in self.languages.iter().zip(self.blocks.iter_mut()) {
            block.push(
                XmlNode::parent(
                    "text",
                    vec![XmlNode::text("value", escape(text.get(language)))],
                )
                .attr("id", escape(path)),
            );
        }
        self.keys.insert(path.to_string());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.keys.contains(path)
    }

    /// Number of registered paths; each has one entry per language.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The `itext` element with one `translation` per language, in language order.
    pub fn into_itext(self) -> XmlNode {
        let translations = self
            .languages
            .into_iter()
            .zip(self.blocks)
            .map(|(language, block)| XmlNode::parent("translation", block).attr("lang", language))
            .collect();
        XmlNode::parent("itext", translations)
    }
}
