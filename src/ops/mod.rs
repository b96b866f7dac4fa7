//! The operator surface (components E, F, G): every function here reads
//! and mutates the process-wide builder state installed by
//! [`crate::set_fhe_param`], wiring a new [`crate::node::ComputeNode`] and
//! result [`crate::node::DataNode`] into the active
//! [`crate::graph::Graph`] on every call.

mod arithmetic;
mod bootstrap;
mod convert;
mod inner_product;
mod input;
mod rotate;

pub use arithmetic::{drop_level, mult, mult_relin, neg, relin, rescale, sub};
pub use arithmetic::add;
pub use bootstrap::bootstrap;
pub use convert::{rns_sp_decomp, to_inv_ntt, to_mform, to_mul, to_ntt};
pub use inner_product::{ct_pt_mult_accumulate, PlaintextOperand};
pub use input::{new_ciphertext, new_compressed_plaintext_ringt, new_plaintext, new_plaintext_mul, new_plaintext_ringt};
pub use rotate::{
	advanced_rotate_cols, rotate_cols, rotate_rows, seal_advanced_rotate_cols, seal_rotate_cols, seal_rotate_rows,
	CiphertextForm,
};

use crate::builder::{self, BuilderState};
use crate::error::{Error, Result};
use crate::node::DataNode;

/// Runs `f` against the locked builder state, after confirming
/// [`crate::set_fhe_param`] has been called.
pub(crate) fn with_state<F, R>(f: F) -> Result<R>
where
	F: FnOnce(&mut BuilderState) -> Result<R>,
{
	let mut state = builder::lock();
	if state.param.is_none() {
		return Err(Error::ConfigError(
			"set_fhe_param() must be called before building graph nodes".into(),
		));
	}
	f(&mut state)
}

/// Looks up a data node by index, or fails with [`Error::GraphError`].
pub(crate) fn require_data<'a>(state: &'a BuilderState, index: u32) -> Result<&'a DataNode> {
	state
		.graph
		.data_node(index)
		.ok_or_else(|| Error::GraphError(format!("no data node at index {index}")))
}

/// Allocates the next compute-table index.
pub(crate) fn next_compute_index(state: &mut BuilderState) -> u32 {
	state.graph.allocate_compute_index()
}

/// Allocates the next data-table index.
pub(crate) fn next_data_index(state: &mut BuilderState) -> u32 {
	state.graph.allocate_data_index()
}
