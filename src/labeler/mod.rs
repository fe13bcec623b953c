//! Airway labeler composing the graph, forest and HMM stages.
//!
//! Overview
//! - [`build_graph`](crate::graph::build_graph) connects particles that pass
//!   the scale-ratio, distance and alignment tests.
//! - [`build_forest`](crate::graph::build_forest) keeps a minimum spanning
//!   forest and orients each tree away from its root.
//! - [`infer_labels`](crate::hmm::infer_labels) walks every tree top-down and
//!   assigns generation labels from the [`ProbabilityModel`](crate::model::ProbabilityModel).
//!
//! Modules
//! - [`params`] – configuration consumed by [`AirwayLabeler`].
//! - `pipeline` – the [`AirwayLabeler`] implementation.

pub mod params;
mod pipeline;

pub use params::LabelerParams;
pub use pipeline::AirwayLabeler;
