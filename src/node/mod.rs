//! The typed node model (component B): [`DataNode`] and [`ComputeNode`].
//!
//! Both are flattened tagged unions with a shared header (`id`, `index`)
//! rather than the source's class hierarchy (spec §9, "Polymorphic node
//! hierarchy"): one Rust enum per node kind carries the variant-specific
//! payload, and the FHE attributes common to every FHE-relevant `DataNode`
//! (`level`, `degree`, `is_ntt`, `is_mform`, `sp_level`) live directly on the
//! struct rather than being duplicated per variant.

mod compute;
mod data;

pub use compute::{ComputeKind, ComputeNode, Lib, PlaintextKind, RotationMode, SealLibTag};
pub use data::{DataKind, DataNode};
