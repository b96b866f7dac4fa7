//! [`KeyTable`]: per-task deduplication of key-switching material.
//!
//! `original_source` keeps one process-wide `g_swk_node_dict: dict[str,
//! SwitchKeyNode]`, keyed by a small fixed vocabulary of key ids
//! (`rlk_ntt`, `glk_ntt_col_<elem>`, `glk_ntt_row`, `swk_dts`, `swk_std`):
//! the first operator that needs a given key allocates it, and every later
//! operator that needs the same key reuses it, raising its `level` to the
//! highest level any consumer has required so far rather than allocating a
//! second copy. [`KeyTable`] reproduces that policy, scoped to one
//! [`crate::graph::Graph`] instead of living at process scope.

use std::collections::BTreeMap;

use crate::graph::Graph;
use crate::node::DataNode;

/// Maps a key's semantic identity (its fixed id string) to the data-table
/// index it was allocated at, so repeat requests reuse the same node.
#[derive(Debug, Default)]
pub struct KeyTable {
	index_by_key: BTreeMap<String, u32>,
}

impl KeyTable {
	/// An empty key table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the relinearization key's data index, allocating it on first
	/// use and raising its level on every later use that needs more.
	pub fn relin_key(&mut self, graph: &mut Graph, alloc: &mut dyn FnMut() -> u32, level: i32, sp_level: u32) -> u32 {
		self.get_or_raise(graph, alloc, "rlk_ntt", level, |id, index| {
			DataNode::relin_key(id, index, level, sp_level)
		})
	}

	/// Returns the Galois key for column rotation by `galois_element`,
	/// allocating or raising its level as needed.
	pub fn galois_col_key(
		&mut self,
		graph: &mut Graph,
		alloc: &mut dyn FnMut() -> u32,
		galois_element: u64,
		level: i32,
		sp_level: u32,
	) -> u32 {
		let key_id = format!("glk_ntt_col_{galois_element}");
		self.get_or_raise(graph, alloc, &key_id, level, |id, index| {
			DataNode::galois_key(id, index, level, sp_level, galois_element)
		})
	}

	/// Returns the single shared Galois key used for row (conjugation)
	/// rotation, allocating or raising its level as needed. `poly_degree`
	/// is the ring dimension `n`, used to compute the fixed
	/// `2n - 1` row-rotation Galois element.
	pub fn galois_row_key(
		&mut self,
		graph: &mut Graph,
		alloc: &mut dyn FnMut() -> u32,
		poly_degree: u64,
		level: i32,
		sp_level: u32,
	) -> u32 {
		let galois_element = crate::galois::galois_element_for_row_rotation(poly_degree);
		self.get_or_raise(graph, alloc, "glk_ntt_row", level, |id, index| {
			DataNode::galois_key(id, index, level, sp_level, galois_element)
		})
	}

	/// Returns the "decrypt-then-switch" key used by bootstrap, fixed at
	/// level 0.
	pub fn switch_key_dts(&mut self, graph: &mut Graph, alloc: &mut dyn FnMut() -> u32, sp_level: u32) -> u32 {
		self.get_or_raise(graph, alloc, "swk_dts", 0, |id, index| {
			DataNode::switch_key(id, index, 0, sp_level)
		})
	}

	/// Returns the "switch-then-decrypt" key used by bootstrap, fixed at
	/// the scheme's top level.
	pub fn switch_key_std(&mut self, graph: &mut Graph, alloc: &mut dyn FnMut() -> u32, max_level: i32, sp_level: u32) -> u32 {
		self.get_or_raise(graph, alloc, "swk_std", max_level, |id, index| {
			DataNode::switch_key(id, index, max_level, sp_level)
		})
	}

	fn get_or_raise(
		&mut self,
		graph: &mut Graph,
		alloc: &mut dyn FnMut() -> u32,
		key_id: &str,
		level: i32,
		make: impl FnOnce(String, u32) -> DataNode,
	) -> u32 {
		if let Some(&index) = self.index_by_key.get(key_id) {
			if let Some(node) = graph.data_node_mut(index) {
				if level > node.level {
					node.level = level;
				}
			}
			return index;
		}
		let index = alloc();
		let node = make(key_id.to_string(), index);
		graph.insert_data(node);
		self.index_by_key.insert(key_id.to_string(), index);
		index
	}

	/// Resets the table, forgetting every allocated key (spec §4.6 step 7:
	/// clear the key table alongside the DAG once a task has been
	/// finalized).
	pub fn clear(&mut self) {
		self.index_by_key.clear();
	}
}
