use std::path::{Path, PathBuf};

use crate::document::node::{Document, FormatNode};
use crate::document::splice::{read_text, splice, write_staged};
use crate::foundation::error::BakeResult;

/// `Count` written for the `AnimationCurve` object type.
///
/// Importers treat definition counts as hints, so this one is not tracked.
pub const ANIMATION_CURVE_DEFINITION_COUNT: usize = 10;

/// Declares the animation object types in the template's `Definitions` section.
#[derive(Clone, Debug)]
pub struct DefinitionsPatcher {
    observed_count: usize,
    scratch_dir: PathBuf,
}

impl DefinitionsPatcher {
    /// Patcher for `observed_count` tracked objects (the root included).
    pub fn new(observed_count: usize, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            observed_count,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// `Count` written for `AnimationCurveNode`.
    pub fn curve_node_count(&self) -> usize {
        self.observed_count * 3
    }

    /// `definitions` with both animation object types appended.
    pub fn extend(&self, mut definitions: FormatNode) -> FormatNode {
        let template = FormatNode::block("PropertyTemplate", "\"FbxAnimCurveNode\"", 0).with_child(
            FormatNode::block("Properties70", "", 0).with_child(FormatNode::leaf(
                "P",
                "\"d\", \"Compound\", \"\", \"\"",
                0,
            )),
        );
        definitions.push_child(
            FormatNode::block("ObjectType", "\"AnimationCurveNode\"", 0)
                .with_child(FormatNode::leaf(
                    "Count",
                    self.curve_node_count().to_string(),
                    0,
                ))
                .with_child(template),
        );
        definitions.push_child(
            FormatNode::block("ObjectType", "\"AnimationCurve\"", 0).with_child(FormatNode::leaf(
                "Count",
                ANIMATION_CURVE_DEFINITION_COUNT.to_string(),
                0,
            )),
        );
        definitions
    }

    /// Rewrite only the `Definitions` section of the file at `path`.
    #[tracing::instrument(skip(self), fields(observed = self.observed_count))]
    pub fn patch(&self, path: &Path) -> BakeResult<()> {
        let text = read_text(path)?;
        let doc = Document::parse(&text)?;
        let span = doc.section_span("Definitions")?;
        let definitions = self.extend(doc.into_section("Definitions")?);
        let patched = splice(&text, span.start, span.end, &definitions.render())?;
        write_staged(path, &patched, &self.scratch_dir)?;
        tracing::info!(path = %path.display(), "definitions section written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/patch/definitions.rs"]
mod tests;
