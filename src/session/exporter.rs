use std::path::PathBuf;

use glam::Vec3;

use crate::capture::sample::{TrackedObject, TransformSample};
use crate::capture::SampleSeries;
use crate::document::node::Document;
use crate::document::sanitize::copy_sanitized;
use crate::document::splice::read_text;
use crate::foundation::coords::{position_to_target, rotation_euler_to_target, scale_to_target};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::ids::{IdAllocator, ObjectId};
use crate::patch::connections::{ConnectionKind, ConnectionsManager, Relation};
use crate::patch::definitions::DefinitionsPatcher;
use crate::patch::objects::{ChannelKind, ObjectsManager};
use crate::session::config::ExportConfig;

const AXES: [&str; 3] = ["X", "Y", "Z"];

/// Lifecycle of an [`Exporter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExporterState {
    /// Not prepared, or back from a finished export.
    Idle,
    /// Template validated, waiting for the start trigger.
    Ready,
    /// Samples are being accumulated.
    Recording,
    /// An export job is in flight; drive it with [`Exporter::poll`].
    Exporting,
}

/// Unit of work performed by one [`Exporter::poll`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ExportStage {
    /// Copy the template to the output path, sanitizing it.
    Copy,
    /// Parse the output and resolve the base layer and existing IDs.
    Parse,
    /// Build curve data for one tracked object.
    Generate,
    /// Patch the `Definitions` section.
    Definitions,
    /// Patch the `Objects` section.
    Objects,
    /// Patch the `Connections` section.
    Connections,
}

/// Summary of a finished export.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExportReport {
    pub output_path: PathBuf,
    /// Tracked objects whose curves were generated.
    pub objects_baked: usize,
    pub curve_nodes: usize,
    pub curves: usize,
    pub connections: usize,
    /// Objects skipped because no matching model exists in the template.
    pub skipped: Vec<String>,
}

/// Result of one [`Exporter::poll`].
#[derive(Debug)]
pub enum ExportProgress {
    /// No export is in flight.
    Idle,
    /// `stage` ran; more work remains.
    Pending(ExportStage),
    /// The output file is complete.
    Finished(ExportReport),
    /// The job aborted; a partially patched output may remain on disk.
    Failed(BakeError),
}

/// Records tracked transforms and bakes them into a copy of the template.
///
/// The export runs as a sequence of stages, one per [`Exporter::poll`], so a host loop is never
/// blocked for the whole pipeline.
#[derive(Debug)]
pub struct Exporter {
    config: ExportConfig,
    state: ExporterState,
    disabled: bool,
    tracked: Vec<TrackedObject>,
    job: Option<ExportJob>,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            state: ExporterState::Idle,
            disabled: false,
            tracked: Vec::new(),
            job: None,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn state(&self) -> ExporterState {
        self.state
    }

    /// `true` once a failed [`Exporter::prepare`] has turned the exporter off.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Objects registered by the last [`Exporter::prepare`], with their samples so far.
    pub fn tracked(&self) -> &[TrackedObject] {
        &self.tracked
    }

    /// Validate the configuration and register the objects to capture.
    ///
    /// On failure the exporter is disabled for good and every later call is ignored.
    #[tracing::instrument(skip(self, objects), fields(objects = objects.len()))]
    pub fn prepare(&mut self, objects: Vec<TrackedObject>) -> BakeResult<()> {
        if self.disabled {
            return Err(BakeError::configuration(
                "exporter is disabled after a failed prepare",
            ));
        }
        if self.state != ExporterState::Idle {
            tracing::warn!(state = ?self.state, "prepare ignored outside Idle");
            return Err(BakeError::configuration(format!(
                "cannot prepare while {:?}",
                self.state
            )));
        }
        if let Err(e) = self.check_paths() {
            tracing::error!(error = %e, "exporter disabled, nothing will be recorded");
            self.disabled = true;
            return Err(e);
        }
        self.tracked = objects;
        self.state = ExporterState::Ready;
        tracing::info!("exporter ready");
        Ok(())
    }

    fn check_paths(&self) -> BakeResult<()> {
        self.config.validate()?;
        let template = self.config.template()?;
        if !template.is_file() {
            return Err(BakeError::configuration(format!(
                "template '{}' does not exist or is not a file",
                template.display()
            )));
        }
        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            BakeError::configuration(format!(
                "cannot create output directory '{}': {e}",
                self.config.output_dir.display()
            ))
        })?;
        Ok(())
    }

    /// `Ready -> Recording`; returns whether the transition happened.
    pub fn start_recording(&mut self) -> bool {
        if self.disabled || self.state != ExporterState::Ready {
            tracing::debug!(state = ?self.state, "start ignored");
            return false;
        }
        self.state = ExporterState::Recording;
        tracing::info!("recording started");
        true
    }

    /// Append one sample per tracked object, in registration order.
    ///
    /// Ignored unless recording. Returns whether the frame was recorded.
    pub fn record_frame(&mut self, samples: &[TransformSample]) -> bool {
        if self.state != ExporterState::Recording {
            return false;
        }
        if samples.len() != self.tracked.len() {
            tracing::warn!(
                expected = self.tracked.len(),
                got = samples.len(),
                "frame sample count does not match tracked objects"
            );
        }
        for (obj, sample) in self.tracked.iter_mut().zip(samples) {
            obj.samples.record(*sample);
        }
        true
    }

    /// Sample series of tracked object `index`, writable only while recording.
    pub fn tracked_mut(&mut self, index: usize) -> Option<&mut SampleSeries> {
        if self.state != ExporterState::Recording {
            return None;
        }
        self.tracked.get_mut(index).map(|o| &mut o.samples)
    }

    /// `Recording -> Exporting`; queues the export job.
    ///
    /// A stop while an export is already in flight is ignored.
    pub fn stop_recording(&mut self) -> bool {
        match self.state {
            ExporterState::Recording => {}
            ExporterState::Exporting => {
                tracing::debug!("stop ignored, export already in progress");
                return false;
            }
            state => {
                tracing::debug!(?state, "stop ignored");
                return false;
            }
        }
        let template = match self.config.template() {
            Ok(t) => t.to_path_buf(),
            Err(e) => {
                tracing::error!(error = %e, "cannot export");
                self.reset();
                return false;
            }
        };
        let output = self.config.resolved_output_path();
        tracing::info!(output = %output.display(), "recording stopped, export queued");
        self.job = Some(ExportJob::new(
            template,
            output,
            std::mem::take(&mut self.tracked),
            &self.config,
        ));
        self.state = ExporterState::Exporting;
        true
    }

    /// Run exactly one export stage.
    pub fn poll(&mut self) -> ExportProgress {
        let Some(job) = self.job.as_mut() else {
            return ExportProgress::Idle;
        };
        let stage = job.stage;
        match job.step(&self.config) {
            Ok(Step::Continue) => ExportProgress::Pending(stage),
            Ok(Step::Done) => {
                let report = std::mem::take(&mut job.report);
                tracing::info!(
                    output = %report.output_path.display(),
                    curve_nodes = report.curve_nodes,
                    curves = report.curves,
                    connections = report.connections,
                    skipped = report.skipped.len(),
                    "export finished"
                );
                self.reset();
                ExportProgress::Finished(report)
            }
            Err(e) => {
                tracing::error!(?stage, output = %job.output.display(), error = %e, "export failed");
                self.reset();
                ExportProgress::Failed(e)
            }
        }
    }

    /// Drive [`Exporter::poll`] until the in-flight export ends.
    pub fn run_to_completion(&mut self) -> BakeResult<ExportReport> {
        loop {
            match self.poll() {
                ExportProgress::Pending(_) => {}
                ExportProgress::Finished(report) => return Ok(report),
                ExportProgress::Failed(e) => return Err(e),
                ExportProgress::Idle => {
                    return Err(BakeError::configuration("no export in progress"));
                }
            }
        }
    }

    fn reset(&mut self) {
        self.job = None;
        self.tracked.clear();
        self.state = ExporterState::Idle;
    }
}

/// Bake already captured objects in one call: prepare, record nothing more, export.
pub fn bake(config: ExportConfig, objects: Vec<TrackedObject>) -> BakeResult<ExportReport> {
    let mut exporter = Exporter::new(config);
    exporter.prepare(objects)?;
    exporter.start_recording();
    exporter.stop_recording();
    exporter.run_to_completion()
}

enum Step {
    Continue,
    Done,
}

/// Patch state parsed from the copied output.
#[derive(Debug)]
struct Workspace {
    objects: ObjectsManager,
    connections: ConnectionsManager,
    ids: IdAllocator,
    base_layer: ObjectId,
}

#[derive(Debug)]
struct ExportJob {
    template: PathBuf,
    output: PathBuf,
    scratch: PathBuf,
    stage: ExportStage,
    tracked: Vec<TrackedObject>,
    cursor: usize,
    workspace: Option<Workspace>,
    report: ExportReport,
}

impl ExportJob {
    fn new(
        template: PathBuf,
        output: PathBuf,
        tracked: Vec<TrackedObject>,
        config: &ExportConfig,
    ) -> Self {
        let scratch = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| config.output_dir.clone());
        Self {
            template,
            report: ExportReport {
                output_path: output.clone(),
                ..ExportReport::default()
            },
            output,
            scratch,
            stage: ExportStage::Copy,
            tracked,
            cursor: 0,
            workspace: None,
        }
    }

    fn step(&mut self, config: &ExportConfig) -> BakeResult<Step> {
        match self.stage {
            ExportStage::Copy => {
                let rewritten =
                    copy_sanitized(&self.template, &self.output, &config.sanitize_marker)?;
                tracing::debug!(rewritten, "template copied");
                self.stage = ExportStage::Parse;
            }
            ExportStage::Parse => {
                self.workspace = Some(self.parse_output(config)?);
                self.stage = ExportStage::Generate;
            }
            ExportStage::Generate => {
                if let Some(obj) = self.tracked.get(self.cursor) {
                    let ws = workspace(&mut self.workspace)?;
                    let outcome = generate_object(ws, obj, config.include_path_name);
                    let name = obj.name.clone();
                    self.record_outcome(name, outcome)?;
                    self.cursor += 1;
                }
                if self.cursor >= self.tracked.len() {
                    self.stage = ExportStage::Definitions;
                }
            }
            ExportStage::Definitions => {
                DefinitionsPatcher::new(self.tracked.len(), &self.scratch).patch(&self.output)?;
                self.stage = ExportStage::Objects;
            }
            ExportStage::Objects => {
                workspace(&mut self.workspace)?
                    .objects
                    .edit_target_file(&self.output)?;
                self.stage = ExportStage::Connections;
            }
            ExportStage::Connections => {
                let ws = workspace(&mut self.workspace)?;
                ws.connections.edit_target_file(&self.output)?;
                self.report.connections = ws.connections.records().len();
                return Ok(Step::Done);
            }
        }
        Ok(Step::Continue)
    }

    #[tracing::instrument(skip(self, config), fields(output = %self.output.display()))]
    fn parse_output(&self, config: &ExportConfig) -> BakeResult<Workspace> {
        let text = read_text(&self.output)?;
        let doc = Document::parse(&text)?;
        doc.section("Definitions")?;
        doc.section("Connections")?;
        let objects_node = doc.into_section("Objects")?;

        let connections = ConnectionsManager::new(text);
        let base_layer = connections.get_animation_base_layer_id()?;
        let ids = IdAllocator::with_reserved(config.id_floor, connections.existing_ids()?);
        tracing::debug!(%base_layer, "output parsed");
        Ok(Workspace {
            objects: ObjectsManager::new(objects_node, &self.scratch)
                .with_frame_rate(config.frame_rate),
            connections,
            ids,
            base_layer,
        })
    }

    fn record_outcome(&mut self, name: String, outcome: BakeResult<Generated>) -> BakeResult<()> {
        match outcome {
            Ok(Generated::Root) => {}
            Ok(Generated::Baked { curve_nodes, curves }) => {
                self.report.objects_baked += 1;
                self.report.curve_nodes += curve_nodes;
                self.report.curves += curves;
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(object = %name, error = %e, "object skipped");
                self.report.skipped.push(name);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

fn workspace(ws: &mut Option<Workspace>) -> BakeResult<&mut Workspace> {
    ws.as_mut()
        .ok_or_else(|| BakeError::Structural("export stage ran before parse".to_owned()))
}

enum Generated {
    Root,
    Baked { curve_nodes: usize, curves: usize },
}

/// Add the curve nodes, curves and connections of one tracked object.
#[tracing::instrument(skip(ws, obj), fields(object = %obj.name))]
fn generate_object(
    ws: &mut Workspace,
    obj: &TrackedObject,
    include_path_name: bool,
) -> BakeResult<Generated> {
    if obj.is_root {
        return Ok(Generated::Root);
    }
    let model_name = obj.name.as_str();
    let model_id = match obj.hierarchy_path(include_path_name) {
        Some(path) => ws.connections.search_object_id_by_path(path)?,
        None => ws.connections.search_object_id(model_name)?,
    };

    let mut curve_nodes = 0;
    let mut curves = 0;
    for channel in ChannelKind::ALL {
        let samples = obj.samples.channel(channel);
        if samples.is_empty() {
            continue;
        }
        let convert = converter(channel);
        let node_id = ws.ids.next_id()?;
        ws.objects
            .add_animation_curve_node(node_id, channel, convert(rest_value(&obj.rest, channel)));
        ws.connections.add_connection_item(
            ConnectionKind::AnimCurveNode,
            channel.tag(),
            node_id,
            "Model",
            model_name,
            model_id,
            Relation::ObjectProperty,
            channel.model_property(),
        );
        ws.connections.add_connection_item(
            ConnectionKind::AnimCurveNode,
            channel.tag(),
            node_id,
            "AnimLayer",
            "BaseLayer",
            ws.base_layer,
            Relation::ObjectObject,
            "",
        );
        curve_nodes += 1;

        let converted: Vec<Vec3> = samples.iter().map(|v| convert(*v)).collect();
        for (axis_index, axis) in AXES.iter().enumerate() {
            let values: Vec<f32> = converted.iter().map(|v| v[axis_index]).collect();
            let curve_id = ws.ids.next_id()?;
            if !ws.objects.add_animation_curve(curve_id, &values) {
                continue;
            }
            ws.connections.add_connection_item(
                ConnectionKind::AnimCurve,
                "",
                curve_id,
                "AnimCurveNode",
                channel.tag(),
                node_id,
                Relation::ObjectProperty,
                &format!("d|{axis}"),
            );
            curves += 1;
        }
    }
    tracing::debug!(curve_nodes, curves, "object generated");
    Ok(Generated::Baked {
        curve_nodes,
        curves,
    })
}

fn converter(channel: ChannelKind) -> fn(Vec3) -> Vec3 {
    match channel {
        ChannelKind::Translation => position_to_target,
        ChannelKind::Rotation => rotation_euler_to_target,
        ChannelKind::Scale => scale_to_target,
    }
}

fn rest_value(rest: &TransformSample, channel: ChannelKind) -> Vec3 {
    match channel {
        ChannelKind::Translation => rest.position,
        ChannelKind::Rotation => rest.rotation,
        ChannelKind::Scale => rest.scale,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/exporter.rs"]
mod tests;
