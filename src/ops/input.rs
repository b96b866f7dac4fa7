//! Entry points for introducing fresh plaintext/ciphertext nodes into the
//! graph — the Rust equivalent of directly instantiating a
//! `BfvCiphertextNode`/`CkksPlaintextNode`/... in `original_source`.

use serde_json::Value;

use crate::error::Result;
use crate::node::DataNode;
use crate::param::Scheme;

use super::{next_data_index, with_state};

/// Declares a fresh scheme-native ciphertext at `level`, with the active
/// scheme's default NTT domain.
pub fn new_ciphertext(level: i32, id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let scheme = state.param.as_ref().expect("checked by with_state").scheme();
		let index = next_data_index(state);
		let id = crate::builder::resolve_id(state, id)?;
		state.graph.insert_data(DataNode::ciphertext(scheme, id, index, level));
		Ok(index)
	})
}

/// Declares a fresh scheme-native plaintext at `level`.
pub fn new_plaintext(level: i32, id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let scheme = state.param.as_ref().expect("checked by with_state").scheme();
		let index = next_data_index(state);
		let id = crate::builder::resolve_id(state, id)?;
		state.graph.insert_data(DataNode::plaintext(scheme, id, index, level));
		Ok(index)
	})
}

/// Declares a fresh `R_t`-ring plaintext, pre-scale-up.
pub fn new_plaintext_ringt(id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let index = next_data_index(state);
		let id = crate::builder::resolve_id(state, id)?;
		state.graph.insert_data(DataNode::plaintext_ringt(id, index));
		Ok(index)
	})
}

/// Declares a fresh blockwise-compressed `R_t`-ring plaintext, carrying
/// `compressed_block_info` opaque per-block descriptors.
pub fn new_compressed_plaintext_ringt(compressed_block_info: Vec<Value>, id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let index = next_data_index(state);
		let id = crate::builder::resolve_id(state, id)?;
		state
			.graph
			.insert_data(DataNode::compressed_plaintext_ringt(id, index, compressed_block_info));
		Ok(index)
	})
}

/// Declares a fresh plaintext already in "mul" (NTT, Montgomery) form.
pub fn new_plaintext_mul(level: i32, id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let index = next_data_index(state);
		let id = crate::builder::resolve_id(state, id)?;
		state.graph.insert_data(DataNode::plaintext_mul(id, index, level));
		Ok(index)
	})
}
