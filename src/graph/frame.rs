//! Frame graph executor
//!
//! Linear execution of render passes over one shared command encoder. Each
//! pass is validated immediately before it runs; a pass whose declared
//! resources do not resolve is skipped with a warning while the rest of the
//! frame proceeds. Passes run in insertion order.

use crate::context::WgpuContext;
use crate::errors::Result;
use crate::graph::pass::RenderPass;
use crate::registry::ResourceRegistry;

/// An ordered list of render passes executed once per frame.
pub struct FrameGraph {
    passes: Vec<Box<dyn RenderPass>>,
}

impl Default for FrameGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameGraph {
    #[must_use]
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Appends a pass. Passes execute in the order they were added.
    pub fn add_pass(&mut self, pass: Box<dyn RenderPass>) {
        self.passes.push(pass);
    }

    /// Appends a pass, chainable.
    #[must_use]
    pub fn with_pass(mut self, pass: Box<dyn RenderPass>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Number of passes in the graph.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Removes all passes.
    pub fn clear(&mut self) {
        self.passes.clear();
    }

    /// Indices of the passes whose dependencies currently resolve.
    ///
    /// A read-only preview of what [`FrameGraph::execute`] would run; the
    /// executor revalidates each pass right before it records commands.
    #[must_use]
    pub fn runnable(&self, registry: &ResourceRegistry) -> Vec<usize> {
        self.passes
            .iter()
            .enumerate()
            .filter(|(_, pass)| pass.dependencies().validate(registry))
            .map(|(index, _)| index)
            .collect()
    }

    /// Executes the frame.
    ///
    /// One command encoder spans all passes; every pass gets a debug group.
    /// Validation failures skip the pass and preserve the frame — execution
    /// errors are contract violations and propagate.
    pub fn execute(&mut self, ctx: &WgpuContext, registry: &mut ResourceRegistry) -> Result<()> {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Graph Encoder"),
            });

        for pass in &mut self.passes {
            if !pass.dependencies().validate(registry) {
                log::warn!("skipping pass \"{}\": unresolved dependencies", pass.name());
                continue;
            }
            encoder.push_debug_group(pass.name());
            pass.execute(registry, ctx, &mut encoder)?;
            encoder.pop_debug_group();
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
