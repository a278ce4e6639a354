//! Tools module - operations the coordinating agent can invoke
//!
//! Contains the plan toolkit and its dispatch.

pub mod plan;

pub use plan::{PlanToolkit, DELEGATE_TOOL};
