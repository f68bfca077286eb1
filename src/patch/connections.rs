use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::path::Path;

use regex::Regex;

use crate::document::node::Document;
use crate::document::splice::{read_text, splice, write_staged};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::ids::ObjectId;

const BASE_LAYER_NAME: &str = "BaseLayer";

/// Source object type of a connection record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ConnectionKind {
    /// A per-channel curve node.
    AnimCurveNode,
    /// A single-axis key curve.
    AnimCurve,
}

impl ConnectionKind {
    /// Type prefix used in object names (`AnimCurveNode::T`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnimCurveNode => "AnimCurveNode",
            Self::AnimCurve => "AnimCurve",
        }
    }
}

/// Edge type of a connection record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Relation {
    /// Object to property (`"OP"`), carries a property name.
    #[serde(rename = "OP")]
    ObjectProperty,
    /// Object to object (`"OO"`).
    #[serde(rename = "OO")]
    ObjectObject,
}

impl Relation {
    /// Wire tag as written in `C:` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ObjectProperty => "OP",
            Self::ObjectObject => "OO",
        }
    }
}

/// One typed edge of the connection graph.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionRecord {
    /// Source object type.
    pub kind: ConnectionKind,
    /// Channel tag of the source (`T`/`R`/`S`), empty for curves.
    pub child_tag: String,
    /// Source object.
    pub source_id: ObjectId,
    /// Target object type (`Model`, `AnimLayer`, `AnimCurveNode`).
    pub target_kind: String,
    /// Target object name, used for the comment line.
    pub target_name: String,
    /// Target object.
    pub target_id: ObjectId,
    /// Edge type.
    pub relation: Relation,
    /// Property name for `OP` edges; empty for `OO`.
    pub property: String,
}

impl fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\t;{}::{}, {}::{}",
            self.kind.as_str(),
            self.child_tag,
            self.target_kind,
            self.target_name
        )?;
        write!(
            f,
            "\tC: \"{}\",{},{}",
            self.relation.as_str(),
            self.source_id,
            self.target_id
        )?;
        if self.relation == Relation::ObjectProperty {
            write!(f, ", \"{}\"", self.property)?;
        }
        writeln!(f)
    }
}

/// Discovers existing object IDs in the raw text and appends new connection records.
#[derive(Debug)]
pub struct ConnectionsManager {
    text: String,
    records: Vec<ConnectionRecord>,
}

impl ConnectionsManager {
    /// Manager over the full interchange text as it was before any connection edits.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            records: Vec::new(),
        }
    }

    /// ID of the animation layer every generated curve node attaches to.
    ///
    /// Prefers the layer named `BaseLayer`, otherwise the first layer declared.
    pub fn get_animation_base_layer_id(&self) -> BakeResult<ObjectId> {
        let re = Regex::new(r#"(?m)^\s*AnimationLayer:\s*(-?\d+)\s*,\s*"AnimLayer::([^"]*)""#)
            .map_err(anyhow::Error::from)?;
        let mut first = None;
        for caps in re.captures_iter(&self.text) {
            let id = parse_id(&caps[1])?;
            if &caps[2] == BASE_LAYER_NAME {
                return Ok(id);
            }
            first.get_or_insert(id);
        }
        match first {
            Some(id) => {
                tracing::debug!(%id, "no BaseLayer, using first animation layer");
                Ok(id)
            }
            None => Err(BakeError::not_found(
                "template has no AnimationLayer (an animation stack is required)",
            )),
        }
    }

    /// ID of the existing `Model` named `name`.
    pub fn search_object_id(&self, name: &str) -> BakeResult<ObjectId> {
        let pattern = format!(
            r#"(?m)^\s*Model:\s*(-?\d+)\s*,\s*"Model::{}""#,
            regex::escape(name)
        );
        let re = Regex::new(&pattern).map_err(anyhow::Error::from)?;
        match re.captures(&self.text) {
            Some(caps) => parse_id(&caps[1]),
            None => Err(BakeError::not_found(format!("Model::{name}"))),
        }
    }

    /// ID of the `Model` named like the last segment of `path` (`Arm/Hand`) whose parent chain in
    /// the connection graph matches the earlier segments.
    ///
    /// Models are named by their bare node name, so the path only picks between same-named models.
    /// When no chain matches, the first model with that name is used.
    pub fn search_object_id_by_path(&self, path: &str) -> BakeResult<ObjectId> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((name, ancestors)) = segments.split_last() else {
            return Err(BakeError::not_found(format!("Model for empty path '{path}'")));
        };

        let names = self.model_names()?;
        let candidates: Vec<ObjectId> = names
            .iter()
            .filter(|(_, n)| n.as_str() == *name)
            .map(|(id, _)| *id)
            .collect();
        let Some(&first) = candidates.first() else {
            return Err(BakeError::not_found(format!("Model::{name}")));
        };
        if candidates.len() == 1 || ancestors.is_empty() {
            return Ok(first);
        }

        let parents = self.object_parents()?;
        let lookup: HashMap<ObjectId, &str> =
            names.iter().map(|(id, n)| (*id, n.as_str())).collect();
        let matched = candidates.iter().copied().find(|&candidate| {
            let mut current = candidate;
            ancestors.iter().rev().all(|segment| {
                let Some(&parent) = parents.get(&current) else {
                    return false;
                };
                current = parent;
                lookup.get(&parent) == Some(segment)
            })
        });
        match matched {
            Some(id) => Ok(id),
            None => {
                tracing::warn!(path, %first, "no model matches the hierarchy, using first by name");
                Ok(first)
            }
        }
    }

    /// Every `Model` declared in the text with its bare name, in file order.
    fn model_names(&self) -> BakeResult<Vec<(ObjectId, String)>> {
        let re = Regex::new(r#"(?m)^\s*Model:\s*(-?\d+)\s*,\s*"Model::([^"]*)""#)
            .map_err(anyhow::Error::from)?;
        re.captures_iter(&self.text)
            .map(|caps| Ok((parse_id(&caps[1])?, caps[2].to_owned())))
            .collect()
    }

    /// Child to parent edges of the template's `OO` connections; the first edge of a child wins.
    fn object_parents(&self) -> BakeResult<HashMap<ObjectId, ObjectId>> {
        let re = Regex::new(r#"(?m)^\s*C:\s*"OO"\s*,\s*(-?\d+)\s*,\s*(-?\d+)"#)
            .map_err(anyhow::Error::from)?;
        let mut parents = HashMap::new();
        for caps in re.captures_iter(&self.text) {
            parents
                .entry(parse_id(&caps[1])?)
                .or_insert(parse_id(&caps[2])?);
        }
        Ok(parents)
    }

    /// Every object ID declared in the text (`Type: <id>, "..."`).
    pub fn existing_ids(&self) -> BakeResult<Vec<ObjectId>> {
        let re = Regex::new(r#"(?m)^\s*[A-Za-z_][A-Za-z0-9_]*:\s*(-?\d+)\s*,\s*""#)
            .map_err(anyhow::Error::from)?;
        re.captures_iter(&self.text)
            .map(|caps| parse_id(&caps[1]))
            .collect()
    }

    /// Append one record; duplicates are not filtered.
    #[allow(clippy::too_many_arguments)]
    pub fn add_connection_item(
        &mut self,
        kind: ConnectionKind,
        child_tag: &str,
        source_id: ObjectId,
        target_kind: &str,
        target_name: &str,
        target_id: ObjectId,
        relation: Relation,
        property: &str,
    ) {
        self.records.push(ConnectionRecord {
            kind,
            child_tag: child_tag.to_owned(),
            source_id,
            target_kind: target_kind.to_owned(),
            target_name: target_name.to_owned(),
            target_id,
            relation,
            property: property.to_owned(),
        });
    }

    /// Records added so far, in insertion order.
    pub fn records(&self) -> &[ConnectionRecord] {
        &self.records
    }

    /// Curve records whose target curve node was not connected by an earlier record.
    pub fn dangling_curve_targets(&self) -> Vec<ObjectId> {
        let mut connected: HashSet<ObjectId> = HashSet::new();
        let mut dangling = Vec::new();
        for r in &self.records {
            match r.kind {
                ConnectionKind::AnimCurveNode => {
                    connected.insert(r.source_id);
                }
                ConnectionKind::AnimCurve => {
                    if !connected.contains(&r.target_id) {
                        dangling.push(r.target_id);
                    }
                }
            }
        }
        dangling
    }

    /// Serialized form of every record, as inserted into the file.
    pub fn render_records(&self) -> String {
        let mut out = String::new();
        for r in &self.records {
            out.push('\n');
            let _ = write!(out, "{r}");
        }
        out
    }

    /// Insert the records just before the `Connections` close brace of the file at `path`.
    #[tracing::instrument(skip(self), fields(records = self.records.len()))]
    pub fn edit_target_file(&self, path: &Path) -> BakeResult<()> {
        let dangling = self.dangling_curve_targets();
        if !dangling.is_empty() {
            return Err(BakeError::Structural(format!(
                "curve connections target unconnected curve nodes: {dangling:?}"
            )));
        }

        let text = read_text(path)?;
        let span = Document::parse(&text)?.section_span("Connections")?;
        let Some(close) = span.close else {
            return Err(BakeError::structural(
                span.line,
                "'Connections' must be a multi-line block",
            ));
        };
        let patched = splice(&text, close, close, &self.render_records())?;
        let scratch = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        write_staged(path, &patched, scratch)?;
        tracing::info!(path = %path.display(), "connections section written");
        Ok(())
    }
}

fn parse_id(s: &str) -> BakeResult<ObjectId> {
    s.parse::<i64>()
        .map(ObjectId)
        .map_err(|e| BakeError::Structural(format!("object id '{s}' is not a 64-bit integer: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/patch/connections.rs"]
mod tests;
