//! Ciphertext/plaintext arithmetic: `add`, `sub`, `neg`, `mult`, `relin`,
//! `rescale`, `drop_level`, `mult_relin`.
//!
//! Grounded on `original_source`'s `add`/`sub`/`neg`/`mult`/`relin`/
//! `mult_relin`/`rescale`/`drop_level`.

use crate::error::{Error, Result};
use crate::node::{ComputeKind, ComputeNode, DataKind, DataNode};

use super::{next_compute_index, next_data_index, require_data, with_state};

fn result_ciphertext(x: &DataNode, level: i32, id: String, index: u32) -> DataNode {
	DataNode {
		id,
		index,
		level,
		degree: 1,
		is_ntt: x.is_ntt,
		is_mform: false,
		sp_level: None,
		kind: DataKind::Ciphertext {
			poly1_rns_sp_decomped: false,
		},
	}
}

/// Ciphertext-ciphertext, ciphertext-plaintext, or plaintext-ciphertext
/// addition.
pub fn add(x: u32, y: u32, output_id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let (x_node, y_node) = (require_data(state, x)?.clone(), require_data(state, y)?.clone());
		let is_ringt = |n: &DataNode| matches!(n.kind, DataKind::PlaintextRingT | DataKind::CompressedPlaintextRingT { .. });
		if !is_ringt(&x_node) && !is_ringt(&y_node) && (x_node.level != y_node.level || x_node.is_ntt != y_node.is_ntt) {
			return Err(Error::TypeMismatch(
				"add operands must share level and NTT domain unless one is an R_t plaintext".into(),
			));
		}
		// Result type follows the ciphertext operand, whichever side it's on
		// (`pt + ct` is accepted for add, unlike `sub`).
		let ct_template = if x_node.is_ciphertext() {
			&x_node
		} else if y_node.is_ciphertext() {
			&y_node
		} else {
			return Err(Error::TypeMismatch("add requires at least one ciphertext operand".into()));
		};

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(id, compute_index, ComputeKind::Add);

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, output_id)?;
		let result = result_ciphertext(ct_template, ct_template.level, result_id, result_index);

		state.graph.insert_compute(op, &[x, y], result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

/// Ciphertext-ciphertext or ciphertext-plaintext subtraction.
pub fn sub(x: u32, y: u32, output_id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let (x_node, y_node) = (require_data(state, x)?.clone(), require_data(state, y)?.clone());
		let y_is_ringt = matches!(y_node.kind, DataKind::PlaintextRingT | DataKind::CompressedPlaintextRingT { .. });
		if !y_is_ringt && (x_node.level != y_node.level || x_node.is_ntt != y_node.is_ntt) {
			return Err(Error::TypeMismatch(
				"sub operands must share level and NTT domain unless the subtrahend is an R_t plaintext".into(),
			));
		}
		if !x_node.is_ciphertext() {
			return Err(Error::TypeMismatch("sub requires a ciphertext minuend".into()));
		}

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(id, compute_index, ComputeKind::Sub);

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, output_id)?;
		let result = result_ciphertext(&x_node, x_node.level, result_id, result_index);

		state.graph.insert_compute(op, &[x, y], result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

/// Ciphertext negation.
pub fn neg(x: u32, output_id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let x_node = require_data(state, x)?.clone();
		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(id, compute_index, ComputeKind::Neg);

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, output_id)?;
		let result = result_ciphertext(&x_node, x_node.level, result_id, result_index);

		state.graph.insert_compute(op, &[x], result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

/// Ciphertext-ciphertext (degree 2 out), ciphertext-plaintext, or
/// plaintext-ciphertext multiplication.
pub fn mult(x: u32, y: u32, output_id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let (x_node, y_node) = (require_data(state, x)?.clone(), require_data(state, y)?.clone());

		let (level, is_ntt, degree) = if x_node.is_ciphertext() && y_node.is_ciphertext() {
			if x_node.level != y_node.level || x_node.degree != 1 || y_node.degree != 1 || x_node.is_ntt != y_node.is_ntt
			{
				return Err(Error::TypeMismatch(
					"ct * ct multiplication requires equal level, degree 1, and matching NTT domain".into(),
				));
			}
			(x_node.level, x_node.is_ntt, 2)
		} else if x_node.is_ciphertext() {
			(x_node.level, x_node.is_ntt, 1)
		} else if y_node.is_ciphertext() {
			(y_node.level, y_node.is_ntt, 1)
		} else {
			return Err(Error::TypeMismatch("mult requires at least one ciphertext operand".into()));
		};

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(id, compute_index, ComputeKind::Mult);

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, output_id)?;
		let result = if degree == 2 {
			DataNode::ciphertext3(crate::param::Scheme::Bfv, result_id, result_index, level)
		} else {
			result_ciphertext(&x_node, level, result_id, result_index)
		};
		let mut result = result;
		result.is_ntt = is_ntt;

		state.graph.insert_compute(op, &[x, y], result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

/// Relinearizes a degree-2 ciphertext back down to degree 1, allocating or
/// raising the shared relinearization key as needed.
pub fn relin(x: u32, output_id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let x_node = require_data(state, x)?.clone();
		if !matches!(x_node.kind, DataKind::Ciphertext3) {
			return Err(Error::TypeMismatch("relin requires a degree-2 ciphertext".into()));
		}

		let max_sp_level = state
			.param
			.as_ref()
			.expect("checked by with_state")
			.get_max_sp_level();
		let key_index = {
			let graph = &mut state.graph;
			let keys = &mut state.keys;
			let mut next = || graph.allocate_data_index();
			keys.relin_key(graph, &mut next, x_node.level, max_sp_level)
		};

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(id, compute_index, ComputeKind::Relin);

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, output_id)?;
		let result = result_ciphertext(&x_node, x_node.level, result_id, result_index);

		state.graph.insert_compute(op, &[x, key_index], result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

/// `mult` immediately followed by `relin`.
pub fn mult_relin(x: u32, y: u32, output_id: Option<String>) -> Result<u32> {
	let ct3 = mult(x, y, output_id.as_ref().map(|id| format!("{id}_ct3")))?;
	relin(ct3, output_id)
}

/// Drops the last prime from the ciphertext modulus (CKKS rescale).
pub fn rescale(x: u32, output_id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let x_node = require_data(state, x)?.clone();
		if !x_node.is_ciphertext() {
			return Err(Error::TypeMismatch("rescale requires a ciphertext".into()));
		}

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(id, compute_index, ComputeKind::Rescale);

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, output_id)?;
		let result = result_ciphertext(&x_node, x_node.level - 1, result_id, result_index);

		state.graph.insert_compute(op, &[x], result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

/// Drops a ciphertext `levels` levels without rescaling, chaining
/// `levels` individual `drop_level` compute nodes.
pub fn drop_level(x: u32, levels: u32, output_id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let mut current = x;
		let mut current_node = require_data(state, x)?.clone();
		if (current_node.level as i64) < levels as i64 {
			return Err(Error::RangeError("dropped levels must not exceed the input level".into()));
		}

		for step in 0..levels {
			let compute_index = next_compute_index(state);
			let id = crate::builder::resolve_id(state, None)?;
			let target_level = current_node.level - 1;
			let op = ComputeNode::new(
				id,
				compute_index,
				ComputeKind::DropLevel { target_level },
			);

			let result_index = next_data_index(state);
			let last = step + 1 == levels;
			let result_id = crate::builder::resolve_id(state, if last { output_id.clone() } else { None })?;
			let result = result_ciphertext(&current_node, target_level, result_id, result_index);

			state.graph.insert_compute(op, &[current], result_index);
			state.graph.insert_data(result.clone());

			current = result_index;
			current_node = result;
		}
		Ok(current)
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::set_fhe_param;
	use crate::param::{Param, Scheme};

	fn fresh_ct(level: i32) -> u32 {
		with_state(|state| {
			let index = next_data_index(state);
			let id = crate::builder::resolve_id(state, None)?;
			state
				.graph
				.insert_data(DataNode::ciphertext(Scheme::Bfv, id, index, level));
			Ok(index)
		})
		.unwrap()
	}

	fn fresh_pt_ringt() -> u32 {
		with_state(|state| {
			let index = next_data_index(state);
			let id = crate::builder::resolve_id(state, None)?;
			state.graph.insert_data(DataNode::plaintext_ringt(id, index));
			Ok(index)
		})
		.unwrap()
	}

	#[test]
	fn add_of_ringt_plaintext_and_ciphertext_follows_the_ciphertext_operand_regardless_of_order() {
		// The ringt plaintext has level=0 and is_ntt=false by construction;
		// `x + y` must still produce a result at the ciphertext's level and
		// NTT domain, whichever side the ciphertext is on.
		set_fhe_param(Param::ckks_default(8192).unwrap());
		let pt = fresh_pt_ringt();
		let ct = with_state(|state| {
			let index = next_data_index(state);
			let id = crate::builder::resolve_id(state, None)?;
			state
				.graph
				.insert_data(DataNode::ciphertext(Scheme::Ckks, id, index, 2));
			Ok(index)
		})
		.unwrap();

		let forward = add(ct, pt, None).unwrap();
		let reversed = add(pt, ct, None).unwrap();
		with_state(|state| {
			let f = require_data(state, forward)?;
			let r = require_data(state, reversed)?;
			assert_eq!(f.level, 2);
			assert!(f.is_ntt);
			assert_eq!(r.level, 2);
			assert!(r.is_ntt);
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn add_preserves_level() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let a = fresh_ct(3);
		let b = fresh_ct(3);
		let result = add(a, b, None).unwrap();
		with_state(|state| {
			assert_eq!(require_data(state, result)?.level, 3);
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn mult_of_two_ciphertexts_yields_degree_two() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let a = fresh_ct(3);
		let b = fresh_ct(3);
		let result = mult(a, b, None).unwrap();
		with_state(|state| {
			assert_eq!(require_data(state, result)?.degree, 2);
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn mult_relin_returns_degree_one() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let a = fresh_ct(3);
		let b = fresh_ct(3);
		let result = mult_relin(a, b, None).unwrap();
		with_state(|state| {
			assert_eq!(require_data(state, result)?.degree, 1);
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn rescale_drops_one_level() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let a = fresh_ct(3);
		let result = rescale(a, None).unwrap();
		with_state(|state| {
			assert_eq!(require_data(state, result)?.level, 2);
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn drop_level_rejects_over_budget_drop() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let a = fresh_ct(1);
		assert!(drop_level(a, 5, None).is_err());
	}
}
