use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{BakeError, BakeResult};

/// Field whose value some templates bake in and which breaks sampled rotations.
pub const DEFAULT_SANITIZE_MARKER: &str = "PreRotation";

const ZEROED_PRE_ROTATION: &str = "P: \"PreRotation\", \"Vector3D\", \"Vector\", \"\",0,0,0";

/// Rewrite every line containing `marker` to a zero-valued `PreRotation` property.
///
/// Leading whitespace and the line terminator are kept; all other lines are untouched.
pub fn sanitize(text: &str, marker: &str) -> String {
    sanitize_counted(text, marker).0
}

/// [`sanitize`], also returning the number of rewritten lines.
pub fn sanitize_counted(text: &str, marker: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut rewritten = 0usize;
    for line in text.split_inclusive('\n') {
        if marker.is_empty() || !line.contains(marker) {
            out.push_str(line);
            continue;
        }
        let content_end = line.trim_end_matches(['\n', '\r']).len();
        let (content, terminator) = line.split_at(content_end);
        let indent_len = content.len() - content.trim_start().len();
        out.push_str(&content[..indent_len]);
        out.push_str(ZEROED_PRE_ROTATION);
        out.push_str(terminator);
        rewritten += 1;
    }
    (out, rewritten)
}

/// Copy `template` to `output`, sanitizing on the way.
///
/// Nothing is written when the template cannot be read.
pub fn copy_sanitized(template: &Path, output: &Path, marker: &str) -> BakeResult<usize> {
    if !template.is_file() {
        return Err(BakeError::configuration(format!(
            "template '{}' does not exist or is not a file",
            template.display()
        )));
    }
    let text = std::fs::read_to_string(template)
        .with_context(|| format!("failed to read template '{}'", template.display()))?;
    let (clean, rewritten) = sanitize_counted(&text, marker);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    std::fs::write(output, clean)
        .with_context(|| format!("failed to write '{}'", output.display()))?;
    tracing::debug!(
        template = %template.display(),
        output = %output.display(),
        rewritten,
        "copied sanitized template"
    );
    Ok(rewritten)
}

#[cfg(test)]
#[path = "../../tests/unit/document/sanitize.rs"]
mod tests;
