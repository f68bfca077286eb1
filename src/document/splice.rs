use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{BakeError, BakeResult};

/// Replace `text[start..end]` with `replacement`, keeping head and tail byte-identical.
pub fn splice(text: &str, start: usize, end: usize, replacement: &str) -> BakeResult<String> {
    if start > end
        || end > text.len()
        || !text.is_char_boundary(start)
        || !text.is_char_boundary(end)
    {
        return Err(BakeError::Structural(format!(
            "splice range {start}..{end} is not valid for a text of {} bytes",
            text.len()
        )));
    }
    let mut out = String::with_capacity(text.len() - (end - start) + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    Ok(out)
}

/// Read a target file as UTF-8 text.
pub fn read_text(path: &Path) -> BakeResult<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok(text)
}

/// Replace `target` with `contents`, staging the new bytes in `scratch_dir` first.
///
/// The staged file is renamed over the target; when the rename is not possible (different
/// filesystems) the bytes are copied instead. The staging file never outlives the call.
pub fn write_staged(target: &Path, contents: &str, scratch_dir: &Path) -> BakeResult<()> {
    std::fs::create_dir_all(scratch_dir).with_context(|| {
        format!(
            "failed to create scratch directory '{}'",
            scratch_dir.display()
        )
    })?;
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_owned());
    let staged = scratch_dir.join(format!(".{file_name}.{}.partial", std::process::id()));
    std::fs::write(&staged, contents)
        .with_context(|| format!("failed to write staging file '{}'", staged.display()))?;

    if std::fs::rename(&staged, target).is_err() {
        let copied = std::fs::copy(&staged, target);
        if let Err(e) = std::fs::remove_file(&staged) {
            tracing::warn!(staged = %staged.display(), error = %e, "failed to remove staging file");
        }
        copied.with_context(|| format!("failed to write '{}'", target.display()))?;
    }
    tracing::debug!(target = %target.display(), bytes = contents.len(), "wrote patched file");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/document/splice.rs"]
mod tests;
