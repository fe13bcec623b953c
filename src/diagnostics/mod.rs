//! Diagnostics data model returned by the labeler.
//!
//! [`LabelingReport`] is the main entry point: the chosen labels plus a
//! [`PipelineTrace`] with one record per stage (graph, forest, model,
//! inference) and a timing breakdown. Everything except the labels
//! serializes to JSON for the command-line tools.

pub mod graph;
pub mod inference;
pub mod model;
pub mod pipeline;
pub mod timing;

pub use graph::{ForestStage, GraphStage};
pub use inference::{InferenceStage, LabelCount};
pub use model::ModelStage;
pub use pipeline::{InputDescriptor, LabelingReport, PipelineTrace};
pub use timing::{elapsed_ms, LabelingStage, StageTiming, TimingBreakdown};
