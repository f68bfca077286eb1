use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::capture::sample::{SampleSeries, TrackedObject, TransformSample, path_name};
use crate::foundation::error::{BakeError, BakeResult};

/// JSON-facing capture of a recording session.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptureFile {
    pub objects: Vec<CapturedObject>,
}

/// One object entry of a [`CaptureFile`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CapturedObject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub is_root: bool,
    #[serde(default)]
    pub rest: TransformSample,
    #[serde(flatten)]
    pub samples: SampleSeries,
}

impl CaptureFile {
    /// Parse a capture from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> BakeResult<Self> {
        let capture: CaptureFile = serde_json::from_reader(r)
            .map_err(|e| BakeError::serde(format!("parse capture JSON: {e}")))?;
        capture.validate()?;
        Ok(capture)
    }

    /// Parse a capture from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> BakeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BakeError::configuration(format!("open capture JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject nameless objects and non-finite samples.
    pub fn validate(&self) -> BakeResult<()> {
        for (i, obj) in self.objects.iter().enumerate() {
            if obj.name.trim().is_empty() {
                return Err(BakeError::serde(format!("capture object #{i} has no name")));
            }
            let s = &obj.samples;
            let mut all = s.positions.iter().chain(&s.rotations).chain(&s.scales);
            if let Some(bad) = all.find(|v| !v.is_finite()) {
                return Err(BakeError::serde(format!(
                    "capture object '{}' has a non-finite sample {bad}",
                    obj.name
                )));
            }
        }
        Ok(())
    }

    /// Convert into tracked objects, preserving order.
    pub fn into_tracked(self) -> Vec<TrackedObject> {
        self.objects
            .into_iter()
            .map(|o| TrackedObject {
                name: o.name,
                path: o.path.map(|p| path_name(p.split('/'))),
                is_root: o.is_root,
                rest: o.rest,
                samples: o.samples,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/file.rs"]
mod tests;
