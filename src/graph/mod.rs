//! Render-pass dependency graph
//!
//! Passes declare their named inputs and outputs up front; the frame graph
//! validates each declaration against the registry right before the pass
//! runs and degrades gracefully when something is missing.

pub mod frame;
pub mod pass;

pub use frame::FrameGraph;
pub use pass::{DependencyDirection, PassDependencies, PassDependency, RenderPass};
