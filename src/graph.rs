//! [`Graph`]: the per-task DAG of data and compute nodes (component C).
//!
//! Data and compute nodes live in separate, independently-indexed tables
//! (`BTreeMap<u32, _>`): since both indices only ever increase, ascending
//! key order already matches insertion order, so no `preserve_order`
//! `serde_json` feature is needed to emit them in the shape
//! `mega_ag.json`/`task_signature.json` expect (spec §6).

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::node::{ComputeNode, DataNode};

/// One endpoint of a DAG edge: either a data node or a compute node,
/// addressed by its index in the owning table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum EdgeEndpoint {
	/// A data-table index, serialized as `"d<index>"`.
	Data(u32),
	/// A compute-table index, serialized as `"c<index>"`.
	Compute(u32),
}

impl EdgeEndpoint {
	fn label(&self) -> String {
		match self {
			EdgeEndpoint::Data(i) => format!("d{i}"),
			EdgeEndpoint::Compute(i) => format!("c{i}"),
		}
	}
}

/// A single directed edge, serialized as a `[from, to]` pair of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "(String, String)")]
pub struct Edge {
	/// The edge's source endpoint.
	pub from: EdgeEndpoint,
	/// The edge's destination endpoint.
	pub to: EdgeEndpoint,
}

impl From<Edge> for (String, String) {
	fn from(edge: Edge) -> Self {
		(edge.from.label(), edge.to.label())
	}
}

/// The per-task DAG: every [`DataNode`] and [`ComputeNode`] built so far,
/// plus the operand/result edges wiring them together.
#[derive(Debug, Default)]
pub struct Graph {
	data: BTreeMap<u32, DataNode>,
	compute: BTreeMap<u32, ComputeNode>,
	edges: Vec<Edge>,
	next_data_index: u32,
	next_compute_index: u32,
}

impl Graph {
	/// An empty graph with both counters at zero.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reserves the next data-table index without inserting anything.
	pub fn allocate_data_index(&mut self) -> u32 {
		let index = self.next_data_index;
		self.next_data_index += 1;
		index
	}

	/// Reserves the next compute-table index without inserting anything.
	pub fn allocate_compute_index(&mut self) -> u32 {
		let index = self.next_compute_index;
		self.next_compute_index += 1;
		index
	}

	/// Inserts a data node, keyed by its own `index`.
	pub fn insert_data(&mut self, node: DataNode) {
		self.data.insert(node.index, node);
	}

	/// Inserts a compute node, keyed by its own `index`, and wires its
	/// operand and result edges.
	///
	/// `operand_indices` may repeat the same data index (e.g. `mult(x, x)`):
	/// the resulting edge set still carries at most one `data -> compute`
	/// edge per distinct operand, applied uniformly across every operator
	/// (spec Open Question: self-edges dedup the same way for every binary
	/// op, `add` and `sub` included).
	pub fn insert_compute(&mut self, node: ComputeNode, operand_indices: &[u32], result_index: u32) {
		let compute_index = node.index;
		let mut seen = HashSet::new();
		for &operand in operand_indices {
			if seen.insert(operand) {
				self.edges.push(Edge {
					from: EdgeEndpoint::Data(operand),
					to: EdgeEndpoint::Compute(compute_index),
				});
			}
		}
		self.edges.push(Edge {
			from: EdgeEndpoint::Compute(compute_index),
			to: EdgeEndpoint::Data(result_index),
		});
		self.compute.insert(compute_index, node);
	}

	/// The data table, in insertion (= ascending index) order.
	pub fn data(&self) -> &BTreeMap<u32, DataNode> {
		&self.data
	}

	/// The compute table, in insertion (= ascending index) order.
	pub fn compute(&self) -> &BTreeMap<u32, ComputeNode> {
		&self.compute
	}

	/// Every edge recorded so far, in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Looks up a data node by index.
	pub fn data_node(&self, index: u32) -> Option<&DataNode> {
		self.data.get(&index)
	}

	/// Looks up a data node by index, for in-place mutation (used by
	/// [`crate::key::KeyTable`] to raise a key's level as higher-level
	/// operands key-switch against it).
	pub fn data_node_mut(&mut self, index: u32) -> Option<&mut DataNode> {
		self.data.get_mut(&index)
	}

	/// Resets the graph to empty, including both index counters (spec
	/// §4.6 step 7: clear the DAG alongside the key table and id
	/// counters once a task has been finalized).
	pub fn clear(&mut self) {
		*self = Self::new();
	}
}
