use glam::Vec3;

use crate::patch::objects::ChannelKind;

/// One frame of an object's local transform in engine space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransformSample {
    /// Local position.
    pub position: Vec3,
    /// Local rotation as Euler degrees, applied Z then X then Y.
    pub rotation: Vec3,
    /// Local scale.
    pub scale: Vec3,
}

impl Default for TransformSample {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Per-channel sample lists; channels may differ in length and may be empty.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SampleSeries {
    pub positions: Vec<Vec3>,
    pub rotations: Vec<Vec3>,
    pub scales: Vec<Vec3>,
}

impl SampleSeries {
    pub fn push_position(&mut self, v: Vec3) {
        self.positions.push(v);
    }

    pub fn push_rotation(&mut self, v: Vec3) {
        self.rotations.push(v);
    }

    pub fn push_scale(&mut self, v: Vec3) {
        self.scales.push(v);
    }

    /// Append one sample to all three channels.
    pub fn record(&mut self, sample: TransformSample) {
        self.push_position(sample.position);
        self.push_rotation(sample.rotation);
        self.push_scale(sample.scale);
    }

    /// Samples of `channel`.
    pub fn channel(&self, channel: ChannelKind) -> &[Vec3] {
        match channel {
            ChannelKind::Translation => &self.positions,
            ChannelKind::Rotation => &self.rotations,
            ChannelKind::Scale => &self.scales,
        }
    }

    /// Longest channel length.
    pub fn frame_count(&self) -> usize {
        self.positions
            .len()
            .max(self.rotations.len())
            .max(self.scales.len())
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.rotations.clear();
        self.scales.clear();
    }
}

/// A scene object whose transform is being captured.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedObject {
    /// Object name; matches `Model::<name>` in the template.
    pub name: String,
    /// Slash-separated hierarchy path below the capture root (`Arm/Hand`).
    pub path: Option<String>,
    /// The capture root is counted but never baked.
    pub is_root: bool,
    /// Rest pose written as curve node defaults.
    pub rest: TransformSample,
    pub samples: SampleSeries,
}

impl TrackedObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            is_root: false,
            rest: TransformSample::default(),
            samples: SampleSeries::default(),
        }
    }

    /// Set the hierarchy path; empty segments (`/Arm//Hand`) are dropped.
    pub fn with_path(mut self, path: impl AsRef<str>) -> Self {
        self.path = Some(path_name(path.as_ref().split('/')));
        self
    }

    pub fn with_rest(mut self, rest: TransformSample) -> Self {
        self.rest = rest;
        self
    }

    pub fn as_root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Hierarchy path used to pick between same-named models, when enabled and known.
    pub fn hierarchy_path(&self, include_path_name: bool) -> Option<&str> {
        self.path
            .as_deref()
            .filter(|path| include_path_name && !path.is_empty())
    }
}

/// Join hierarchy segments below the capture root into a path name.
pub fn path_name<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for s in segments {
        let s = s.as_ref();
        if s.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(s);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/capture/sample.rs"]
mod tests;
