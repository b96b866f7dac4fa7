//! Domain-conversion operators: `to_ntt`, `to_inv_ntt`, `to_mform`,
//! `to_mul`, `rns_sp_decomp`.

use crate::error::{Error, Result};
use crate::node::{ComputeKind, ComputeNode, DataKind};

use super::{next_compute_index, next_data_index, require_data, with_state};

fn unary_op(x: u32, kind: ComputeKind, output_id: Option<String>, transform: impl FnOnce(&mut crate::node::DataNode)) -> Result<u32> {
	with_state(|state| {
		let mut result = require_data(state, x)?.clone();
		transform(&mut result);

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(id, compute_index, kind);

		let result_index = next_data_index(state);
		result.index = result_index;
		result.id = crate::builder::resolve_id(state, output_id)?;

		state.graph.insert_compute(op, &[x], result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

/// Converts a ciphertext into NTT (evaluation) domain.
pub fn to_ntt(x: u32, output_id: Option<String>) -> Result<u32> {
	{
		let already_ntt = with_state(|state| Ok(require_data(state, x)?.is_ntt))?;
		if already_ntt {
			return Err(Error::TypeMismatch("to_ntt requires a non-NTT-domain input".into()));
		}
	}
	unary_op(x, ComputeKind::ToNtt, output_id, |node| node.is_ntt = true)
}

/// Converts a ciphertext out of NTT domain.
pub fn to_inv_ntt(x: u32, output_id: Option<String>) -> Result<u32> {
	{
		let is_ntt = with_state(|state| Ok(require_data(state, x)?.is_ntt))?;
		if !is_ntt {
			return Err(Error::TypeMismatch("to_inv_ntt requires an NTT-domain input".into()));
		}
	}
	unary_op(x, ComputeKind::ToInvNtt, output_id, |node| node.is_ntt = false)
}

/// Converts a plaintext or ciphertext into Montgomery form.
pub fn to_mform(x: u32, output_id: Option<String>) -> Result<u32> {
	{
		let is_mform = with_state(|state| Ok(require_data(state, x)?.is_mform))?;
		if is_mform {
			return Err(Error::TypeMismatch("to_mform requires a non-Montgomery-form input".into()));
		}
	}
	unary_op(x, ComputeKind::ToMForm, output_id, |node| node.is_mform = true)
}

/// Converts a scheme-native plaintext into "mul" form (NTT domain,
/// Montgomery form).
pub fn to_mul(x: u32, output_id: Option<String>) -> Result<u32> {
	{
		let (is_ntt, is_mform) = with_state(|state| {
			let node = require_data(state, x)?;
			Ok((node.is_ntt, node.is_mform))
		})?;
		if is_ntt || is_mform {
			return Err(Error::TypeMismatch("to_mul requires a non-NTT, non-Montgomery input".into()));
		}
	}
	unary_op(x, ComputeKind::ToMul, output_id, |node| {
		node.is_ntt = true;
		node.is_mform = true;
		node.kind = DataKind::PlaintextMul;
	})
}

/// RNS special-modulus decomposition of a ciphertext's first polynomial,
/// the precursor step every key-switch consumes.
pub fn rns_sp_decomp(x: u32, output_id: Option<String>) -> Result<u32> {
	unary_op(x, ComputeKind::RnsSpDecomp, output_id, |node| {
		if let DataKind::Ciphertext { poly1_rns_sp_decomped } = &mut node.kind {
			*poly1_rns_sp_decomped = true;
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::set_fhe_param;
	use crate::node::DataNode;
	use crate::ops::{next_data_index, with_state};
	use crate::param::{Param, Scheme};

	fn fresh_ct(is_ntt: bool) -> u32 {
		with_state(|state| {
			let index = next_data_index(state);
			let id = crate::builder::resolve_id(state, None)?;
			let mut node = DataNode::ciphertext(Scheme::Bfv, id, index, 2);
			node.is_ntt = is_ntt;
			state.graph.insert_data(node);
			Ok(index)
		})
		.unwrap()
	}

	#[test]
	fn to_ntt_then_back_round_trips_domain_flag() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let x = fresh_ct(false);
		let ntt = to_ntt(x, None).unwrap();
		let back = to_inv_ntt(ntt, None).unwrap();
		with_state(|state| {
			assert!(!state.graph.data_node(back).unwrap().is_ntt);
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn to_ntt_rejects_already_ntt_input() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let x = fresh_ct(true);
		assert!(to_ntt(x, None).is_err());
	}

	#[test]
	fn rns_sp_decomp_flags_the_result() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let x = fresh_ct(false);
		let y = rns_sp_decomp(x, None).unwrap();
		with_state(|state| {
			match &state.graph.data_node(y).unwrap().kind {
				DataKind::Ciphertext { poly1_rns_sp_decomped } => assert!(*poly1_rns_sp_decomped),
				other => panic!("unexpected kind {other:?}"),
			}
			Ok(())
		})
		.unwrap();
	}
}
