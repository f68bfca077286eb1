use crate::document::parser::parse;
use crate::foundation::error::{BakeError, BakeResult};

/// Source location of a parsed node.
///
/// Offsets are byte offsets into the text the node was parsed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    /// Start of the node's first line (indentation included).
    pub start: usize,
    /// Start of the line holding the matching `}` for block nodes spanning several lines.
    pub close: Option<usize>,
    /// One past the node's last line terminator (or end of text).
    pub end: usize,
    /// 1-based line number of the node's first line.
    pub line: usize,
}

/// One named, attribute-bearing element of the interchange text.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatNode {
    /// Node identifier (`Objects`, `Model`, `P`, ...).
    pub name: String,
    /// Raw attribute text after `Name:`; wrapped continuation lines are kept verbatim after `\n`.
    pub attributes: String,
    /// Nesting level; one tab of indentation per level when rendered.
    pub depth: usize,
    /// Ordered children.
    pub children: Vec<FormatNode>,
    /// `true` when the node is written with braces even without children.
    pub block: bool,
    /// Where the node came from, if it was parsed.
    pub span: Option<Span>,
}

impl FormatNode {
    /// Single-line node (`Name: attrs`).
    pub fn leaf(name: impl Into<String>, attributes: impl Into<String>, depth: usize) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.into(),
            depth,
            children: Vec::new(),
            block: false,
            span: None,
        }
    }

    /// Brace-delimited node (`Name: attrs {` ... `}`).
    pub fn block(name: impl Into<String>, attributes: impl Into<String>, depth: usize) -> Self {
        Self {
            block: true,
            ..Self::leaf(name, attributes, depth)
        }
    }

    /// Builder-style [`FormatNode::push_child`].
    pub fn with_child(mut self, child: FormatNode) -> Self {
        self.push_child(child);
        self
    }

    /// Append `child`, re-depthing its subtree to sit one level below `self`.
    pub fn push_child(&mut self, mut child: FormatNode) {
        child.set_depth(self.depth + 1);
        self.block = true;
        self.children.push(child);
    }

    /// Set this node's depth and shift every descendant accordingly.
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        for c in &mut self.children {
            c.set_depth(depth + 1);
        }
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&FormatNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children named `name`, in order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormatNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Whether the node renders with braces.
    pub fn is_block(&self) -> bool {
        self.block || !self.children.is_empty()
    }

    /// Render this node and its subtree, one `\n`-terminated line per node.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    /// Append the rendering of this subtree to `out`.
    pub fn render_into(&self, out: &mut String) {
        let indent = "\t".repeat(self.depth);
        out.push_str(&indent);
        out.push_str(&self.name);
        out.push_str(": ");
        out.push_str(&self.attributes);
        if !self.is_block() {
            out.push('\n');
            return;
        }
        out.push_str(" {\n");
        for c in &self.children {
            c.render_into(out);
        }
        out.push_str(&indent);
        out.push_str("}\n");
    }
}

/// Top-level node list of one interchange text.
#[derive(Clone, Debug, Default)]
pub struct Document {
    /// Top-level nodes in file order.
    pub nodes: Vec<FormatNode>,
}

impl Document {
    /// Parse a whole text; fails on any structural problem.
    pub fn parse(text: &str) -> BakeResult<Self> {
        Ok(Self {
            nodes: parse(text, 0)?,
        })
    }

    /// First top-level node named `name`.
    pub fn section(&self, name: &str) -> BakeResult<&FormatNode> {
        self.nodes
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| BakeError::lookup(name))
    }

    /// Take ownership of the first top-level node named `name`.
    pub fn into_section(self, name: &str) -> BakeResult<FormatNode> {
        self.nodes
            .into_iter()
            .find(|n| n.name == name)
            .ok_or_else(|| BakeError::lookup(name))
    }

    /// Source span of a parsed top-level section.
    pub fn section_span(&self, name: &str) -> BakeResult<Span> {
        self.section(name)?.span.ok_or_else(|| {
            BakeError::Structural(format!("section '{name}' has no source span"))
        })
    }

    /// Render every top-level node.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for n in &self.nodes {
            n.render_into(&mut out);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/node.rs"]
mod tests;
