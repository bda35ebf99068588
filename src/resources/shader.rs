//! Shaders
//!
//! Shader text reaches the registry either inline or as a library path; the
//! [`ShaderLibrary`] is the in-memory source store the embedding layer fills
//! (actual file or network I/O happens outside this crate). `#include`
//! directives are expanded recursively against the library before the
//! module is compiled.
//!
//! WGSL compilation errors surface asynchronously through wgpu's own
//! validation machinery, not as failures at the build call site.

use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_128;

use crate::context::WgpuContext;
use crate::errors::{CinderError, Result};
use crate::registry::ResourceCategory;
use crate::resources::{BindingShape, GpuResource, ResourceState};

/// Where a shader's WGSL comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShaderSource {
    /// A path registered in the [`ShaderLibrary`]
    Path(String),
    /// Inline WGSL
    Code(String),
}

// ============================================================================
// Shader library
// ============================================================================

/// In-memory store of WGSL sources, keyed by path.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    sources: FxHashMap<String, String>,
}

impl ShaderLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the source text behind a path.
    pub fn register(&mut self, path: impl Into<String>, code: impl Into<String>) {
        self.sources.insert(path.into(), code.into());
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Resolves a [`ShaderSource`] to final WGSL with all `#include`
    /// directives expanded.
    pub fn resolve(&self, source: &ShaderSource) -> Result<String> {
        let mut stack = Vec::new();
        match source {
            ShaderSource::Code(code) => self.expand(code, &mut stack),
            ShaderSource::Path(path) => {
                let code = self.lookup(path)?;
                stack.push(path.clone());
                self.expand(code, &mut stack)
            }
        }
    }

    fn lookup(&self, path: &str) -> Result<&String> {
        self.sources.get(path).ok_or_else(|| CinderError::NotFound {
            category: ResourceCategory::ShaderSource,
            name: path.to_string(),
        })
    }

    /// Replaces every `#include "path"` line with the referenced source,
    /// recursively. `stack` holds the chain of paths currently being
    /// expanded, which is what catches include cycles.
    fn expand(&self, code: &str, stack: &mut Vec<String>) -> Result<String> {
        let mut out = String::with_capacity(code.len());
        for line in code.lines() {
            if let Some(path) = parse_include(line) {
                if stack.iter().any(|p| p == path) {
                    return Err(CinderError::InvalidDescriptor {
                        name: path.to_string(),
                        reason: "cyclic #include".to_string(),
                    });
                }
                let included = self.lookup(path)?;
                stack.push(path.to_string());
                out.push_str(&self.expand(included, stack)?);
                stack.pop();
            } else {
                out.push_str(line);
            }
            out.push('\n');
        }
        Ok(out)
    }
}

/// Parses `#include "path"`, returning the path.
fn parse_include(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("#include")?.trim();
    rest.strip_prefix('"')?.strip_suffix('"')
}

// ============================================================================
// Resource
// ============================================================================

/// A WGSL shader module resource.
pub struct ShaderResource {
    source: ShaderSource,
    /// Final WGSL after include expansion
    code: String,
    /// xxh3-128 of the final WGSL, for dedup and cache keys
    code_hash: u128,
    state: ResourceState,
    handle: Option<wgpu::ShaderModule>,
}

impl ShaderResource {
    /// Wraps already-resolved WGSL. The registry resolves through its
    /// shader library before constructing this.
    #[must_use]
    pub fn new(source: ShaderSource, code: String) -> Self {
        let code_hash = xxh3_128(code.as_bytes());
        Self {
            source,
            code,
            code_hash,
            state: ResourceState::default(),
            handle: None,
        }
    }

    /// The declared source (path or inline).
    #[must_use]
    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    /// The resolved WGSL.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Content hash of the resolved WGSL.
    #[must_use]
    pub fn code_hash(&self) -> u128 {
        self.code_hash
    }

    /// The compiled module, if built.
    #[must_use]
    pub fn module(&self) -> Option<&wgpu::ShaderModule> {
        self.handle.as_ref()
    }

    /// Replaces the shader source, dropping the compiled module when the
    /// final code actually changed.
    pub fn set_source(&mut self, source: ShaderSource, code: String) {
        let code_hash = xxh3_128(code.as_bytes());
        self.source = source;
        if code_hash != self.code_hash {
            self.code = code;
            self.code_hash = code_hash;
            self.destroy();
            self.state.invalidated();
        }
    }
}

impl GpuResource for ShaderResource {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("shader source is empty".to_string());
        }
        Ok(())
    }

    fn build(&mut self, ctx: &WgpuContext, label: &str) {
        self.handle = Some(ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(self.code.clone().into()),
        }));
    }

    fn destroy(&mut self) {
        self.handle = None;
    }

    fn is_built(&self) -> bool {
        self.handle.is_some()
    }

    fn binding_shape(&self) -> Option<BindingShape> {
        None
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_expands_recursively() {
        let mut library = ShaderLibrary::new();
        library.register("common.wgsl", "const PI: f32 = 3.14159;");
        library.register(
            "lighting.wgsl",
            "#include \"common.wgsl\"\nfn attenuate() {}",
        );

        let code = library
            .resolve(&ShaderSource::Path("lighting.wgsl".to_string()))
            .unwrap();
        assert!(code.contains("const PI"));
        assert!(code.contains("fn attenuate"));
    }

    #[test]
    fn include_cycle_is_rejected() {
        let mut library = ShaderLibrary::new();
        library.register("a.wgsl", "#include \"b.wgsl\"");
        library.register("b.wgsl", "#include \"a.wgsl\"");

        let err = library.resolve(&ShaderSource::Path("a.wgsl".to_string()));
        assert!(err.is_err());
    }

    #[test]
    fn missing_include_is_not_found() {
        let library = ShaderLibrary::new();
        let err = library.resolve(&ShaderSource::Code("#include \"ghost.wgsl\"".to_string()));
        assert!(matches!(err, Err(CinderError::NotFound { .. })));
    }
}
