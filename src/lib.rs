//! fbxbake bakes captured transform animation into an ASCII FBX template.
//!
//! The template is never modelled as a whole. Only node boundaries are parsed; the `Definitions`,
//! `Objects` and `Connections` sections are patched in place and every other byte is preserved:
//!
//! - Capture samples per tracked object ([`TrackedObject`], [`CaptureFile`])
//! - Drive an [`Exporter`] through `prepare -> start -> stop`, then [`Exporter::poll`] it
//! - Or call [`bake`] for already captured data
#![forbid(unsafe_code)]

/// Captured transform samples.
pub mod capture;
/// Brace-structured text parsing, rendering and splicing.
pub mod document;
pub mod foundation;
/// Section patchers for curve nodes, curves, connections and definitions.
pub mod patch;
/// Export configuration and the staged exporter.
pub mod session;

pub use crate::capture::{CaptureFile, SampleSeries, TrackedObject, TransformSample};
pub use crate::document::node::{Document, FormatNode};
pub use crate::foundation::error::{BakeError, BakeResult};
pub use crate::foundation::ids::{IdAllocator, ObjectId};
pub use crate::session::config::ExportConfig;
pub use crate::session::exporter::{
    ExportProgress, ExportReport, ExportStage, Exporter, ExporterState, bake,
};
