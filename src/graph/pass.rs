//! Render passes and their dependency declarations
//!
//! A pass declares, at construction time, the named resources it reads and
//! writes. Declaration never validates — resources may not exist yet when a
//! pass is authored. Validation happens against the registry immediately
//! before the pass executes; an unresolved name aborts only that pass, not
//! the frame.
//!
//! The Input/Output direction is advisory metadata for tooling and debug
//! output. Passes execute in the order they were added to the graph; no
//! topological scheduling is derived from the declarations.

use crate::context::WgpuContext;
use crate::errors::Result;
use crate::registry::{ResourceCategory, ResourceRegistry};

/// Whether a pass reads or writes a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyDirection {
    Input,
    Output,
}

/// One declared dependency of a pass.
#[derive(Debug, Clone)]
pub struct PassDependency {
    /// Name to resolve in the registry
    pub resource: String,
    /// Category the name lives in
    pub category: ResourceCategory,
    pub direction: DependencyDirection,
    /// Free-form annotation carried through to logs and tooling
    pub metadata: Option<String>,
}

/// The ordered dependency set of one pass.
#[derive(Debug, Clone, Default)]
pub struct PassDependencies {
    dependencies: Vec<PassDependency>,
}

impl PassDependencies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a dependency. No validation happens here.
    pub fn add(
        &mut self,
        resource: impl Into<String>,
        category: ResourceCategory,
        direction: DependencyDirection,
    ) -> &mut Self {
        self.dependencies.push(PassDependency {
            resource: resource.into(),
            category,
            direction,
            metadata: None,
        });
        self
    }

    /// Declares a dependency carrying an annotation.
    pub fn add_with_metadata(
        &mut self,
        resource: impl Into<String>,
        category: ResourceCategory,
        direction: DependencyDirection,
        metadata: impl Into<String>,
    ) -> &mut Self {
        self.dependencies.push(PassDependency {
            resource: resource.into(),
            category,
            direction,
            metadata: Some(metadata.into()),
        });
        self
    }

    /// Declared dependencies, in declaration order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, PassDependency> {
        self.dependencies.iter()
    }

    /// Declared inputs only.
    pub fn inputs(&self) -> impl Iterator<Item = &PassDependency> {
        self.dependencies
            .iter()
            .filter(|d| d.direction == DependencyDirection::Input)
    }

    /// Declared outputs only.
    pub fn outputs(&self) -> impl Iterator<Item = &PassDependency> {
        self.dependencies
            .iter()
            .filter(|d| d.direction == DependencyDirection::Output)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Whether the pass declared nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Resolves every declared name against the registry.
    ///
    /// Returns false on the first unresolved name — the caller skips the
    /// pass for this frame instead of failing it.
    #[must_use]
    pub fn validate(&self, registry: &ResourceRegistry) -> bool {
        for dependency in &self.dependencies {
            if !registry.contains(dependency.category, &dependency.resource) {
                log::warn!(
                    "unresolved {} dependency \"{}\"",
                    dependency.category,
                    dependency.resource
                );
                return false;
            }
        }
        true
    }
}

impl<'a> IntoIterator for &'a PassDependencies {
    type Item = &'a PassDependency;
    type IntoIter = std::slice::Iter<'a, PassDependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.dependencies.iter()
    }
}

/// A named unit of rendering work with declared resource dependencies.
///
/// `execute` records GPU commands into the frame's shared encoder. It runs
/// only after [`PassDependencies::validate`] succeeded for this frame, so
/// registry lookups for declared names are expected to succeed.
pub trait RenderPass {
    /// Pass name, used for debug groups and log lines.
    fn name(&self) -> &str;

    /// The dependencies declared at construction time.
    fn dependencies(&self) -> &PassDependencies;

    /// Records this pass's GPU work.
    fn execute(
        &mut self,
        registry: &mut ResourceRegistry,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Result<()>;
}
