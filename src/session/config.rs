use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::document::sanitize::DEFAULT_SANITIZE_MARKER;
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::ids::{DEFAULT_ID_FLOOR, MAX_ID_FLOOR};
use crate::patch::objects::DEFAULT_FRAME_RATE;

/// Settings of one export session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Template interchange file the output is derived from.
    pub template_path: Option<PathBuf>,
    /// Directory receiving the output; created on prepare.
    pub output_dir: PathBuf,
    /// Output file name; a timestamped name is generated when unset.
    pub output_file: Option<String>,
    /// Captured frames per second.
    pub frame_rate: u32,
    /// Look objects up by hierarchy path instead of bare name.
    pub include_path_name: bool,
    /// Smallest ID handed to generated objects.
    pub id_floor: i64,
    /// Lines containing this marker are neutralized before parsing.
    pub sanitize_marker: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            output_dir: PathBuf::from("Exports"),
            output_file: None,
            frame_rate: DEFAULT_FRAME_RATE,
            include_path_name: false,
            id_floor: DEFAULT_ID_FLOOR,
            sanitize_marker: DEFAULT_SANITIZE_MARKER.to_owned(),
        }
    }
}

impl ExportConfig {
    /// Config for `template`, everything else defaulted.
    pub fn for_template(template: impl Into<PathBuf>) -> Self {
        Self {
            template_path: Some(template.into()),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file; absent keys take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> BakeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BakeError::configuration(format!("open config JSON '{}': {e}", path.display()))
        })?;
        let cfg: ExportConfig = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| BakeError::serde(format!("parse config JSON '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> BakeResult<()> {
        if self.frame_rate == 0 {
            return Err(BakeError::configuration("frame_rate must be > 0"));
        }
        if self.sanitize_marker.is_empty() {
            return Err(BakeError::configuration("sanitize_marker must not be empty"));
        }
        if self.id_floor <= 0 || self.id_floor > MAX_ID_FLOOR {
            return Err(BakeError::configuration(format!(
                "id_floor must be in 1..={MAX_ID_FLOOR}"
            )));
        }
        if let Some(name) = &self.output_file {
            let p = Path::new(name);
            if name.is_empty() || p.file_name().is_none() || p.components().count() != 1 {
                return Err(BakeError::configuration(format!(
                    "output_file '{name}' must be a plain file name"
                )));
            }
        }
        Ok(())
    }

    /// The configured template, or a configuration error when unset.
    pub fn template(&self) -> BakeResult<&Path> {
        self.template_path
            .as_deref()
            .ok_or_else(|| BakeError::configuration("no template file configured"))
    }

    /// Full path of the output file, generating a timestamped name if none is set.
    pub fn resolved_output_path(&self) -> PathBuf {
        let name = match &self.output_file {
            Some(name) => name.clone(),
            None => default_output_name(chrono::Local::now()),
        };
        self.output_dir.join(name)
    }
}

/// `capture_YYYYMMDD_HHMMSS.fbx` for `now`.
pub fn default_output_name<Tz: chrono::TimeZone>(now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("capture_{}.fbx", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
