//! Materials
//!
//! A material maps to a (shader, pipeline, bind-group-layout) triple cached
//! by structural equivalence: authoring code hands the cache a plain
//! [`MaterialDescriptor`]; the cache hands back a [`MaterialId`] that is
//! shared between all descriptors with the same GPU-affecting shape.

pub mod cache;
pub mod descriptor;

pub use cache::{MaterialCache, MaterialEntry, MaterialId};
pub use descriptor::{
    MaterialAttributes, MaterialBindingEntry, MaterialBindingLayout, MaterialDescriptor,
    MaterialIdentity, MaterialPipelineDesc, fx_hash_key,
};
