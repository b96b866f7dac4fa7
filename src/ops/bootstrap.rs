//! CKKS bootstrap: raises a level-0 ciphertext back up to the output level
//! in [`crate::param::BootstrapLevels`].
//!
//! Grounded on `original_source`'s `bootstrap`, which wires every key the
//! bootstrap sub-circuit needs (a relin key, one Galois key per
//! fixed bootstrap rotation, the row key, and the two bootstrap
//! switch-keys) as operand edges on a single compute node.

use crate::error::{Error, Result};
use crate::galois::{self, LATTIGO_GALOIS_GEN};
use crate::node::{ComputeKind, ComputeNode, DataKind};
use crate::param::Scheme;

use super::{next_compute_index, next_data_index, require_data, with_state};

/// CKKS bootstrap of a level-0 ciphertext.
pub fn bootstrap(x: u32, output_id: Option<String>) -> Result<u32> {
	with_state(|state| {
		let param = state.param.as_ref().expect("checked by with_state").clone();
		if param.scheme() != Scheme::Ckks {
			return Err(Error::TypeMismatch("bootstrap is only defined for CKKS".into()));
		}
		let bootstrap_levels = param
			.bootstrap_levels()
			.ok_or_else(|| Error::ConfigError("Param carries no CKKS bootstrap checkpoints".into()))?;

		let x_node = require_data(state, x)?.clone();
		if !x_node.is_ciphertext() {
			return Err(Error::TypeMismatch("bootstrap requires a ciphertext".into()));
		}
		if x_node.level != 0 {
			return Err(Error::RangeError("bootstrap requires a level-0 input ciphertext".into()));
		}

		let max_level = param.max_level() as i32;
		let max_sp_level = param.get_max_sp_level();

		let mut operand_indices = vec![x];

		let relin_key = {
			let graph = &mut state.graph;
			let keys = &mut state.keys;
			let mut alloc = || graph.allocate_data_index();
			keys.relin_key(graph, &mut alloc, max_level, max_sp_level)
		};
		operand_indices.push(relin_key);

		for &rot in galois::rotations_for_bootstrapping(param.n())?.iter() {
			let gal_elem = galois::galois_element_for_column_rotation(rot, param.n(), LATTIGO_GALOIS_GEN);
			let key_index = {
				let graph = &mut state.graph;
				let keys = &mut state.keys;
				let mut alloc = || graph.allocate_data_index();
				keys.galois_col_key(graph, &mut alloc, gal_elem, max_level, max_sp_level)
			};
			operand_indices.push(key_index);
		}

		let row_key = {
			let graph = &mut state.graph;
			let keys = &mut state.keys;
			let mut alloc = || graph.allocate_data_index();
			keys.galois_row_key(graph, &mut alloc, param.n(), max_level, max_sp_level)
		};
		operand_indices.push(row_key);

		let swk_dts = {
			let graph = &mut state.graph;
			let keys = &mut state.keys;
			let mut alloc = || graph.allocate_data_index();
			keys.switch_key_dts(graph, &mut alloc, max_sp_level)
		};
		let swk_std = {
			let graph = &mut state.graph;
			let keys = &mut state.keys;
			let mut alloc = || graph.allocate_data_index();
			keys.switch_key_std(graph, &mut alloc, max_level, max_sp_level)
		};
		operand_indices.push(swk_dts);
		operand_indices.push(swk_std);

		let compute_index = next_compute_index(state);
		let id = crate::builder::resolve_id(state, None)?;
		let op = ComputeNode::new(id, compute_index, ComputeKind::Bootstrap);

		let result_index = next_data_index(state);
		let result_id = crate::builder::resolve_id(state, output_id)?;
		let result = crate::node::DataNode {
			id: result_id,
			index: result_index,
			level: bootstrap_levels.output as i32,
			degree: 1,
			is_ntt: x_node.is_ntt,
			is_mform: false,
			sp_level: None,
			kind: DataKind::Ciphertext {
				poly1_rns_sp_decomped: false,
			},
		};

		state.graph.insert_compute(op, &operand_indices, result_index);
		state.graph.insert_data(result);
		Ok(result_index)
	})
}
