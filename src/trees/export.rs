//! XML rendering of a built tree.
use super::{classifier::Id3Classifier, node::NodeId};
use crate::error::{Error, Result};

/// Attribute names already taken by every `<node>` element.
const RESERVED: [&str; 2] = ["classes", "entropy"];

impl Id3Classifier {
    /// Renders the tree as XML.
    ///
    /// The root becomes a `<tree>` element, every other node a `<node>`
    /// element named after its parent's split attribute and branch value.
    /// Elements carry the label counts and entropy of their subset; leaves
    /// hold their label as text.
    pub fn to_xml(&self) -> Result<String> {
        let root = self.root().ok_or(Error::NotFitted)?;
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        out.push_str(&format!(
            "<tree classes=\"{}\" entropy=\"{:.6}\"",
            escape(&root.classes()),
            root.entropy
        ));
        self.write_body(&mut out, 0, 0);
        out.push_str("</tree>\n");
        Ok(out)
    }

    fn write_body(&self, out: &mut String, id: NodeId, depth: usize) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.is_leaf() {
            out.push('>');
            out.push_str(&escape(node.label.as_deref().unwrap_or(&node.majority_label)));
            return;
        }

        out.push_str(">\n");
        let attribute = node
            .attribute
            .map(|attribute| attribute_name(&self.attribute_name(attribute), attribute))
            .unwrap_or_default();
        let indent = "  ".repeat(depth + 1);
        for (value, child) in self.children(id) {
            let Some(child_node) = self.node(child) else {
                continue;
            };
            out.push_str(&format!(
                "{}<node classes=\"{}\" entropy=\"{:.6}\" {}=\"{}\"",
                indent,
                escape(&child_node.classes()),
                child_node.entropy,
                attribute,
                escape(value)
            ));
            self.write_body(out, child, depth + 1);
            if !child_node.is_leaf() {
                out.push_str(&indent);
            }
            out.push_str("</node>\n");
        }
    }
}

/// Escapes markup characters in text and attribute values.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Turns a column name into a usable XML attribute name.
///
/// Names that would clash with the fixed attributes or the reserved `xml`
/// prefix fall back to `attr<index>`.
fn attribute_name(name: &str, index: usize) -> String {
    let mut sanitized = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
        .collect::<String>();
    if !sanitized.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        sanitized.insert(0, '_');
    }
    let lowered = sanitized.to_lowercase();
    if RESERVED.contains(&lowered.as_str()) || lowered.starts_with("xml") {
        return format!("attr{}", index);
    }
    sanitized
}
