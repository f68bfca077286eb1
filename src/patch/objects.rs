use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::document::node::{Document, FormatNode};
use crate::document::splice::{read_text, splice, write_staged};
use crate::foundation::error::BakeResult;
use crate::foundation::ids::ObjectId;

/// FBX time units per second.
pub const FBX_TICKS_PER_SECOND: i64 = 46_186_158_000;

/// Frame rate used when none is configured.
pub const DEFAULT_FRAME_RATE: u32 = 24;

const KEY_VERSION: &str = "4009";
const KEY_ATTR_FLAGS: &str = "24840";
const KEY_ATTR_DATA: &str = "0,0,255790911,0";

/// FBX time between two consecutive captured frames.
pub fn ticks_per_frame(frame_rate: u32) -> i64 {
    FBX_TICKS_PER_SECOND / i64::from(frame_rate.max(1))
}

/// Transform channel animated by one curve node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ChannelKind {
    /// `Lcl Translation`.
    Translation,
    /// `Lcl Rotation`.
    Rotation,
    /// `Lcl Scaling`.
    Scale,
}

impl ChannelKind {
    /// All channels in emission order.
    pub const ALL: [ChannelKind; 3] = [Self::Translation, Self::Rotation, Self::Scale];

    /// Short tag used in curve node names (`AnimCurveNode::T`).
    pub fn tag(self) -> &'static str {
        match self {
            Self::Translation => "T",
            Self::Rotation => "R",
            Self::Scale => "S",
        }
    }

    /// Model property the curve node drives.
    pub fn model_property(self) -> &'static str {
        match self {
            Self::Translation => "Lcl Translation",
            Self::Rotation => "Lcl Rotation",
            Self::Scale => "Lcl Scaling",
        }
    }
}

/// Builds animation objects under the template's `Objects` node and writes them back.
#[derive(Debug)]
pub struct ObjectsManager {
    root: FormatNode,
    pristine_len: usize,
    scratch_dir: PathBuf,
    ticks_per_frame: i64,
}

impl ObjectsManager {
    /// Manage `objects` (the parsed `Objects` section); staging files go to `scratch_dir`.
    pub fn new(objects: FormatNode, scratch_dir: impl Into<PathBuf>) -> Self {
        let pristine_len = objects.children.len();
        Self {
            root: objects,
            pristine_len,
            scratch_dir: scratch_dir.into(),
            ticks_per_frame: ticks_per_frame(DEFAULT_FRAME_RATE),
        }
    }

    /// Space key times for `frame_rate` captured frames per second.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.ticks_per_frame = ticks_per_frame(frame_rate);
        self
    }

    /// The managed `Objects` node, including anything added so far.
    pub fn node(&self) -> &FormatNode {
        &self.root
    }

    /// Number of nodes added since construction or the last [`Self::clear_saved_data`].
    pub fn added_count(&self) -> usize {
        self.root.children.len() - self.pristine_len
    }

    /// Append an `AnimationCurveNode` for `channel` whose default value is `default`.
    pub fn add_animation_curve_node(&mut self, id: ObjectId, channel: ChannelKind, default: Vec3) {
        let mut props = FormatNode::block("Properties70", "", 0);
        for (axis, v) in [("X", default.x), ("Y", default.y), ("Z", default.z)] {
            props.push_child(FormatNode::leaf(
                "P",
                format!("\"d|{axis}\", \"Number\", \"\", \"A\",{}", fmt_value(v)),
                0,
            ));
        }
        let node = FormatNode::block(
            "AnimationCurveNode",
            format!("{id}, \"AnimCurveNode::{}\", \"\"", channel.tag()),
            0,
        )
        .with_child(props);
        self.root.push_child(node);
    }

    /// Append an `AnimationCurve` with one key per sample.
    ///
    /// Returns `false` (and adds nothing) when `samples` is empty.
    pub fn add_animation_curve(&mut self, id: ObjectId, samples: &[f32]) -> bool {
        if samples.is_empty() {
            return false;
        }
        let count = samples.len();

        let mut times = String::new();
        let mut values = String::new();
        for (i, v) in samples.iter().enumerate() {
            if i > 0 {
                times.push(',');
                values.push(',');
            }
            let _ = write!(times, "{}", i as i64 * self.ticks_per_frame);
            values.push_str(&fmt_value(*v));
        }

        let node = FormatNode::block("AnimationCurve", format!("{id}, \"AnimCurve::\", \"\""), 0)
            .with_child(FormatNode::leaf("Default", "0", 0))
            .with_child(FormatNode::leaf("KeyVer", KEY_VERSION, 0))
            .with_child(array_node("KeyTime", count, times))
            .with_child(array_node("KeyValueFloat", count, values))
            .with_child(array_node("KeyAttrFlags", 1, KEY_ATTR_FLAGS.to_owned()))
            .with_child(array_node("KeyAttrDataFloat", 4, KEY_ATTR_DATA.to_owned()))
            .with_child(array_node("KeyAttrRefCount", 1, count.to_string()));
        self.root.push_child(node);
        true
    }

    /// Replace the `Objects` section of the file at `path` with the current rendering.
    #[tracing::instrument(skip(self), fields(added = self.added_count()))]
    pub fn edit_target_file(&self, path: &Path) -> BakeResult<()> {
        let text = read_text(path)?;
        let span = Document::parse(&text)?.section_span("Objects")?;
        let patched = splice(&text, span.start, span.end, &self.root.render())?;
        write_staged(path, &patched, &self.scratch_dir)?;
        tracing::info!(path = %path.display(), "objects section written");
        Ok(())
    }

    /// Drop every node added since construction.
    pub fn clear_saved_data(&mut self) {
        self.root.children.truncate(self.pristine_len);
    }
}

fn array_node(name: &str, count: usize, data: String) -> FormatNode {
    FormatNode::block(name, format!("*{count}"), 0).with_child(FormatNode::leaf("a", data, 0))
}

/// Shortest round-trip decimal form; non-finite values are written as 0.
pub(crate) fn fmt_value(v: f32) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        "0".to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/patch/objects.rs"]
mod tests;
