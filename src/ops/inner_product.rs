//! Plaintext-ciphertext vector inner product (component G): a greedy
//! fused-slice compiler over `ct_pt_mult_accumulate_slice` /
//! `ct_pt_mult_accumulate_add_ct_slice`-style nodes, grounded on
//! `original_source`'s `ct_pt_mult_accumulate`.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::node::{ComputeKind, ComputeNode, DataKind, PlaintextKind};

use super::{next_compute_index, next_data_index, require_data, with_state, to_mform};

/// One plaintext operand of [`ct_pt_mult_accumulate`]: a plain plaintext
/// node, or a slice of a blockwise-compressed `R_t` plaintext addressed by
/// block index.
#[derive(Debug, Clone, Copy)]
pub enum PlaintextOperand {
	/// An ordinary `pt` or `pt_ringt` plaintext data-table index.
	Plain(u32),
	/// A slice of a compressed `R_t` plaintext: the compressed node's
	/// index, and which block to use.
	Compressed { node: u32, block: usize },
}

const FUSED_SLICE_SIZES: [usize; 5] = [16, 8, 4, 2, 1];

/// Computes the inner product of ciphertext vector `xs` against plaintext
/// vector `ys` (same length), fusing multiplications into the largest
/// power-of-two slices the remaining length supports.
pub fn ct_pt_mult_accumulate(xs: &[u32], ys: &[PlaintextOperand], output_mform: Option<bool>) -> Result<u32> {
	if xs.is_empty() || xs.len() != ys.len() {
		return Err(Error::ArgError("ct_pt_mult_accumulate requires equal-length, non-empty operand vectors".into()));
	}

	let mut processed = first_slice_len(xs.len());
	let mut partial = mult_accumulate_slice(&xs[0..processed], &ys[0..processed])?;

	while processed < xs.len() {
		let slice_size = FUSED_SLICE_SIZES
			.iter()
			.copied()
			.find(|&s| xs.len() - processed >= s)
			.unwrap_or(1);
		let mut slice_x: Vec<u32> = xs[processed..processed + slice_size].to_vec();
		let slice_y = &ys[processed..processed + slice_size];
		slice_x.push(partial);
		partial = mult_accumulate_add_slice(&slice_x, slice_y)?;
		processed += slice_size;
	}

	let x0_is_mform = with_state(|state| Ok(require_data(state, xs[0])?.is_mform))?;
	if output_mform == Some(true) || (output_mform.is_none() && x0_is_mform) {
		partial = to_mform(partial, None)?;
	}
	Ok(partial)
}

fn first_slice_len(n: usize) -> usize {
	FUSED_SLICE_SIZES.iter().copied().find(|&s| n >= s).unwrap_or(1)
}

fn classify(ys: &[PlaintextOperand], state: &crate::builder::BuilderState) -> Result<(PlaintextKind, Option<Vec<Value>>)> {
	match ys[0] {
		PlaintextOperand::Plain(idx) => {
			let kind = match require_data(state, idx)?.kind {
				DataKind::PlaintextRingT | DataKind::CompressedPlaintextRingT { .. } => PlaintextKind::PlaintextRingT,
				_ => PlaintextKind::Plaintext,
			};
			Ok((kind, None))
		}
		PlaintextOperand::Compressed { node, .. } => {
			let blocks = match &require_data(state, node)?.kind {
				DataKind::CompressedPlaintextRingT { compressed_block_info, .. } => {
					ys.iter()
						.map(|y| match y {
							PlaintextOperand::Compressed { block, .. } => compressed_block_info
								.get(*block)
								.cloned()
								.ok_or_else(|| Error::RangeError(format!("no compressed block at index {block}"))),
							PlaintextOperand::Plain(_) => Err(Error::ArgError(
								"cannot mix compressed and plain plaintext operands in one slice".into(),
							)),
						})
						.collect::<Result<Vec<_>>>()?
				}
				_ => return Err(Error::TypeMismatch("compressed operand does not reference a compressed plaintext node".into())),
			};
			Ok((PlaintextKind::PlaintextRingT, Some(blocks)))
		}
	}
}

fn operand_index(y: PlaintextOperand) -> u32 {
	match y {
		PlaintextOperand::Plain(idx) => idx,
		PlaintextOperand::Compressed { node, .. } => node,
	}
}

/// `ct_pt_mult_accumulate_slice`: a fresh fused multiply-accumulate over
/// `count` ciphertext-plaintext pairs, `count` in `{1, 2, 4, 8, 16}`.
fn mult_accumulate_slice(xs: &[u32], ys: &[PlaintextOperand]) -> Result<u32> {
	with_state(|state| {
		let level = require_data(state, xs[0])?.level;
		let is_ntt = require_data(state, xs[0])?.is_ntt;
		let (pt_kind, compressed_block_info) = classify(ys, state)?;

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(
			id,
			compute_index,
			ComputeKind::CmpSum {
				count: xs.len() as u32,
				pt_kind,
				compressed_block_info,
			},
		);

		let mut operands: Vec<u32> = xs.to_vec();
		operands.extend(ys.iter().map(|y| operand_index(*y)));

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, None)?;
		let result = crate::node::DataNode {
			id: result_id,
			index: result_index,
			level,
			degree: 1,
			is_ntt,
			is_mform: false,
			sp_level: None,
			kind: DataKind::Ciphertext {
				poly1_rns_sp_decomped: false,
			},
		};

		state.graph.insert_compute(op, &operands, result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

/// `ct_pt_mult_accumulate_add_ct_slice`: folds `count = len(ys)` further
/// ciphertext-plaintext products into a running `partial_sum` carried as
/// the last entry of `xs`.
fn mult_accumulate_add_slice(xs: &[u32], ys: &[PlaintextOperand]) -> Result<u32> {
	if xs.len() != ys.len() + 1 {
		return Err(Error::ArgError("fused accumulate-add slice needs one more ciphertext than plaintext operand".into()));
	}
	with_state(|state| {
		let level = require_data(state, xs[0])?.level;
		let is_ntt = require_data(state, xs[0])?.is_ntt;
		let (pt_kind, compressed_block_info) = classify(ys, state)?;

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(
			id,
			compute_index,
			ComputeKind::CmpacSum {
				count: ys.len() as u32,
				pt_kind,
				compressed_block_info,
			},
		);

		let mut operands: Vec<u32> = xs.to_vec();
		operands.extend(ys.iter().map(|y| operand_index(*y)));

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, None)?;
		let result = crate::node::DataNode {
			id: result_id,
			index: result_index,
			level,
			degree: 1,
			is_ntt,
			is_mform: false,
			sp_level: None,
			kind: DataKind::Ciphertext {
				poly1_rns_sp_decomped: false,
			},
		};

		state.graph.insert_compute(op, &operands, result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::set_fhe_param;
	use crate::node::DataNode;
	use crate::ops::next_data_index;
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

	fn fresh_pt() -> PlaintextOperand {
		PlaintextOperand::Plain(
			with_state(|state| {
				let index = next_data_index(state);
				let id = crate::builder::resolve_id(state, None)?;
				state.graph.insert_data(DataNode::plaintext(Scheme::Bfv, id, index, 3));
				Ok(index)
			})
			.unwrap(),
		)
	}

	#[test]
	fn small_vector_uses_one_fused_slice() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let xs: Vec<u32> = (0..4).map(|_| fresh_ct(3)).collect();
		let ys: Vec<PlaintextOperand> = (0..4).map(|_| fresh_pt()).collect();
		let result = ct_pt_mult_accumulate(&xs, &ys, None).unwrap();
		with_state(|state| {
			assert_eq!(state.graph.data_node(result).unwrap().level, 3);
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn five_operands_start_with_a_four_wide_fused_slice() {
		// spec scenario S4: m=5 slices as an initial CmpSum(4) followed by a
		// CmpacSum(1) tail, not four successive CmpacSum(1) folds.
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let xs: Vec<u32> = (0..5).map(|_| fresh_ct(3)).collect();
		let ys: Vec<PlaintextOperand> = (0..5).map(|_| fresh_pt()).collect();
		ct_pt_mult_accumulate(&xs, &ys, None).unwrap();
		with_state(|state| {
			let mut computes: Vec<_> = state.graph.compute().values().collect();
			computes.sort_by_key(|c| c.index);
			assert_eq!(computes.len(), 2);
			match &computes[0].kind {
				ComputeKind::CmpSum { count, .. } => assert_eq!(*count, 4),
				other => panic!("expected CmpSum(4), got {other:?}"),
			}
			match &computes[1].kind {
				ComputeKind::CmpacSum { count, .. } => assert_eq!(*count, 1),
				other => panic!("expected CmpacSum(1), got {other:?}"),
			}
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn odd_length_vector_folds_a_tail_slice() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let xs: Vec<u32> = (0..9).map(|_| fresh_ct(3)).collect();
		let ys: Vec<PlaintextOperand> = (0..9).map(|_| fresh_pt()).collect();
		assert!(ct_pt_mult_accumulate(&xs, &ys, None).is_ok());
	}

	#[test]
	fn mismatched_lengths_are_rejected() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let xs = vec![fresh_ct(3)];
		let ys = vec![fresh_pt(), fresh_pt()];
		assert!(ct_pt_mult_accumulate(&xs, &ys, None).is_err());
	}
}
