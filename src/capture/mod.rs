//! Captured transform data: per-object sample series and the JSON capture file.

pub mod file;
pub mod sample;

pub use file::{CaptureFile, CapturedObject};
pub use sample::{SampleSeries, TrackedObject, TransformSample};
