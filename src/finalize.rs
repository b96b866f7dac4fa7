//! [`process_custom_task`]: validates the in-progress graph against its
//! declared inputs/outputs and emits `mega_ag.json`/`task_signature.json`.
//!
//! Grounded on `original_source`'s `process_custom_task`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::argument::Argument;
use crate::builder;
use crate::error::{Error, Result};
use crate::galois;
use crate::graph::EdgeEndpoint;
use crate::node::DataKind;

/// The abstract computation graph returned by [`process_custom_task`] and
/// written out as `mega_ag.json`.
#[derive(Debug, Serialize)]
pub struct MegaAg {
	pub name: String,
	pub algorithm: String,
	pub data: BTreeMap<u32, Value>,
	pub compute: BTreeMap<u32, Value>,
	pub inputs: Vec<u32>,
	pub outputs: Vec<u32>,
	pub offline_inputs: Vec<u32>,
	pub parameter: Value,
}

struct SigEntry {
	node: Value,
}

/// Validates the graph built so far against `input_args`/`output_args`/
/// `offline_input_args`, writes `mega_ag.json` and `task_signature.json`
/// under `output_dir`, and clears the DAG and key table for the next task
/// (spec §4.6 step 7).
pub fn process_custom_task(
	input_args: &[Argument],
	output_args: &[Argument],
	offline_input_args: &[Argument],
	output_dir: &Path,
) -> Result<MegaAg> {
	let mut state = builder::lock();
	let param = state
		.param
		.clone()
		.ok_or_else(|| Error::ConfigError("set_fhe_param() must be called before process_custom_task()".into()))?;

	let mut used_arg_ids = HashSet::new();
	let (all_input, input_sig) = process_data_args(&state.graph, input_args, "in", &mut used_arg_ids)?;
	let (all_output, output_sig) = process_data_args(&state.graph, output_args, "out", &mut used_arg_ids)?;
	let (all_offline, offline_sig) = process_data_args(&state.graph, offline_input_args, "offline", &mut used_arg_ids)?;

	let mut all_input_with_key = all_input;
	all_input_with_key.extend(all_offline.iter().copied());

	let rlk_signature = state
		.graph
		.data()
		.values()
		.find(|n| n.id == "rlk_ntt")
		.map(|n| {
			all_input_with_key.push(n.index);
			n.level
		})
		.unwrap_or(-1);

	let mut glk_signature: BTreeMap<u64, i32> = BTreeMap::new();
	for node in state.graph.data().values() {
		if let DataKind::GaloisKey { galois_element } = &node.kind {
			if node.id == "glk_ntt_row" {
				glk_signature.insert(galois::galois_element_for_row_rotation(param.n()), node.level);
			} else {
				glk_signature.insert(*galois_element, node.level);
			}
			all_input_with_key.push(node.index);
		}
	}

	let mut ckks_btp_swk_signature: BTreeMap<String, (i32, Option<u32>)> = BTreeMap::new();
	for node in state.graph.data().values() {
		if matches!(&node.kind, DataKind::SwitchKey) {
			ckks_btp_swk_signature.insert(node.id.clone(), (node.level, node.sp_level));
			all_input_with_key.push(node.index);
		}
	}

	for &index in &all_input_with_key {
		let has_consumer = state
			.graph
			.edges()
			.iter()
			.any(|e| matches!(e.from, EdgeEndpoint::Data(i) if i == index));
		if !has_consumer {
			let id = state
				.graph
				.data_node(index)
				.map(|n| n.id.clone())
				.unwrap_or_default();
			return Err(Error::GraphError(format!(
				"input data node {id:?} is not used for any computation"
			)));
		}
	}

	let mut data_map = BTreeMap::new();
	for node in state.graph.data().values() {
		let has_consumer = state
			.graph
			.edges()
			.iter()
			.any(|e| matches!(e.from, EdgeEndpoint::Data(i) if i == node.index));
		if !has_consumer && !all_output.contains(&node.index) {
			return Err(Error::GraphError(format!(
				"data node {:?} is not used for any computation, nor is it an output",
				node.id
			)));
		}
		data_map.insert(node.index, serde_json::to_value(node).expect("DataNode always serializes"));
	}

	let mut compute_map = BTreeMap::new();
	for node in state.graph.compute().values() {
		let mut value = serde_json::to_value(node).expect("ComputeNode always serializes");
		let inputs: Vec<u32> = state
			.graph
			.edges()
			.iter()
			.filter_map(|e| match (e.from, e.to) {
				(EdgeEndpoint::Data(d), EdgeEndpoint::Compute(c)) if c == node.index => Some(d),
				_ => None,
			})
			.collect();
		let outputs: Vec<u32> = state
			.graph
			.edges()
			.iter()
			.filter_map(|e| match (e.from, e.to) {
				(EdgeEndpoint::Compute(c), EdgeEndpoint::Data(d)) if c == node.index => Some(d),
				_ => None,
			})
			.collect();
		if let Value::Object(map) = &mut value {
			map.insert("inputs".into(), serde_json::json!(inputs));
			map.insert("outputs".into(), serde_json::json!(outputs));
		}
		compute_map.insert(node.index, value);
	}

	let mut parameter = serde_json::json!({
		"n": param.n(),
		"max_level": param.max_level(),
		"q": param.q(),
		"p": param.p(),
	});
	if let Some(scale) = param.scale() {
		parameter["scale"] = serde_json::json!(scale);
	}
	if let Some(levels) = param.bootstrap_levels() {
		parameter["btp_cts_start_level"] = serde_json::json!(levels.cts_start);
		parameter["btp_eval_mod_start_level"] = serde_json::json!(levels.eval_mod_start);
		parameter["btp_stc_start_level"] = serde_json::json!(levels.stc_start);
		parameter["btp_output_level"] = serde_json::json!(levels.output);
	}
	if let Some(t) = param.t() {
		parameter["t"] = serde_json::json!(t);
	}

	let mag = MegaAg {
		name: "Acc task".to_string(),
		algorithm: scheme_label(param.scheme()),
		data: data_map,
		compute: compute_map,
		inputs: all_input_with_key,
		outputs: all_output,
		offline_inputs: all_offline,
		parameter,
	};

	let mut key_json = serde_json::json!({ "rlk": rlk_signature, "glk": glk_signature });
	if !ckks_btp_swk_signature.is_empty() {
		key_json["ckks_btp_swk"] = serde_json::json!(ckks_btp_swk_signature);
	}

	let mut online = input_sig.into_iter().map(|e| e.node).collect::<Vec<_>>();
	online.extend(output_sig.into_iter().map(|e| e.node));
	let interface_json = serde_json::json!({
		"algorithm": scheme_label(param.scheme()),
		"key": key_json,
		"online": online,
		"offline": offline_sig.into_iter().map(|e| e.node).collect::<Vec<_>>(),
	});

	fs::create_dir_all(output_dir).map_err(|e| Error::Io(e.to_string()))?;
	write_pretty(&output_dir.join("mega_ag.json"), &mag)?;
	write_pretty(&output_dir.join("task_signature.json"), &interface_json)?;

	state.graph.clear();
	state.keys.clear();
	state.used_ids.clear();

	Ok(mag)
}

fn scheme_label(scheme: crate::param::Scheme) -> String {
	match scheme {
		crate::param::Scheme::Bfv => "bfv".to_string(),
		crate::param::Scheme::Ckks => "ckks".to_string(),
	}
}

fn process_data_args(
	graph: &crate::graph::Graph,
	args: &[Argument],
	phase: &str,
	used_arg_ids: &mut HashSet<String>,
) -> Result<(Vec<u32>, Vec<SigEntry>)> {
	let mut all_indices = Vec::new();
	let mut sig_entries = Vec::new();

	for arg in args {
		let indices = arg.flatten();
		if indices.is_empty() {
			return Err(Error::ArgError(format!("no data for argument {:?}", arg.id)));
		}
		if !used_arg_ids.insert(arg.id.clone()) {
			return Err(Error::ArgError(format!("argument id {:?} is reused", arg.id)));
		}

		let first = graph
			.data_node(indices[0])
			.ok_or_else(|| Error::GraphError(format!("argument {:?} references an unknown data node", arg.id)))?;

		let node = serde_json::json!({
			"id": arg.id,
			"type": first.type_tag(),
			"size": arg.shape(),
			"level": first.level,
			"phase": phase,
		});
		sig_entries.push(SigEntry { node });
		all_indices.extend(indices);
	}

	Ok((all_indices, sig_entries))
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
	let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
	let mut buf = Vec::new();
	let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
	value.serialize(&mut ser).map_err(|e| Error::Io(e.to_string()))?;
	fs::write(path, buf).map_err(|e| Error::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::set_fhe_param;
	use crate::node::DataNode;
	use crate::ops::{add, mult_relin, next_data_index, with_state};
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

	#[test]
	fn rejects_unused_input() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let x = fresh_ct(3);
		let dir = std::env::temp_dir().join("mega_ag_test_unused");
		let inputs = vec![Argument::scalar("x", x)];
		let result = process_custom_task(&inputs, &[], &[], &dir);
		assert!(result.is_err());
	}

	#[test]
	fn builds_mega_ag_for_a_simple_add() {
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let a = fresh_ct(3);
		let b = fresh_ct(3);
		let c = add(a, b, Some("z".into())).unwrap();

		let dir = std::env::temp_dir().join("mega_ag_test_add");
		let inputs = vec![Argument::scalar("a", a), Argument::scalar("b", b)];
		let outputs = vec![Argument::scalar("z", c)];
		let mag = process_custom_task(&inputs, &outputs, &[], &dir).unwrap();

		assert_eq!(mag.outputs, vec![c]);
		assert!(dir.join("mega_ag.json").exists());
		assert!(dir.join("task_signature.json").exists());
	}

	#[test]
	fn s1_bfv_multiply_relin_emits_one_mult_one_relin_and_a_leveled_rlk() {
		// spec scenario S1: scheme BFV, n=16384; x = BfvCiphertextNode("x", 3),
		// y = BfvCiphertextNode("y", 3), z = mult_relin(x, y, "z").
		set_fhe_param(Param::bfv_default(16384).unwrap());
		let x = fresh_ct(3);
		let y = fresh_ct(3);
		let z = mult_relin(x, y, Some("z".into())).unwrap();

		let dir = std::env::temp_dir().join("mega_ag_test_s1_bfv_mult_relin");
		let inputs = vec![Argument::scalar("x", x), Argument::scalar("y", y)];
		let outputs = vec![Argument::scalar("z", z)];
		let mag = process_custom_task(&inputs, &outputs, &[], &dir).unwrap();

		let mults: Vec<_> = mag
			.compute
			.values()
			.filter(|v| v["type"] == "mult")
			.collect();
		let relins: Vec<_> = mag
			.compute
			.values()
			.filter(|v| v["type"] == "relin")
			.collect();
		assert_eq!(mults.len(), 1);
		assert_eq!(mults[0]["inputs"].as_array().unwrap().len(), 2);
		assert_eq!(relins.len(), 1);
		assert_eq!(relins[0]["inputs"].as_array().unwrap().len(), 2);

		let ct3_nodes: Vec<_> = mag.data.values().filter(|v| v["type"] == "ct3").collect();
		assert_eq!(ct3_nodes.len(), 1);
		assert_eq!(ct3_nodes[0]["degree"], 2);

		let z_node = mag
			.data
			.values()
			.find(|v| v["id"] == "z")
			.expect("output z is in the emitted data map");
		assert_eq!(z_node["type"], "ct");
		assert_eq!(z_node["level"], 3);

		let rlk = mag
			.data
			.values()
			.find(|v| v["id"] == "rlk_ntt")
			.expect("relin key is emitted");
		assert_eq!(rlk["level"], 3);
	}

	#[test]
	fn s6_duplicate_argument_id_is_rejected_and_writes_nothing() {
		// spec scenario S6: two Argument instances with identical id => ArgError,
		// no files written.
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let a = fresh_ct(3);
		let b = fresh_ct(3);
		let c = add(a, b, None).unwrap();

		let dir = std::env::temp_dir().join("mega_ag_test_s6_dup_arg_id");
		let _ = std::fs::remove_dir_all(&dir);
		let inputs = vec![Argument::scalar("dup", a), Argument::scalar("dup", b)];
		let outputs = vec![Argument::scalar("z", c)];
		let result = process_custom_task(&inputs, &outputs, &[], &dir);

		assert!(matches!(result, Err(Error::ArgError(_))));
		assert!(!dir.join("mega_ag.json").exists());
		assert!(!dir.join("task_signature.json").exists());
	}

	#[test]
	fn process_custom_task_clears_used_ids_too() {
		// spec §8.6: after process_custom_task the in-memory context is empty,
		// counters reset to 0, key table empty, dag empty, used-ids empty.
		set_fhe_param(Param::bfv_default(8192).unwrap());
		let a = fresh_ct(3);
		let b = fresh_ct(3);
		let c = add(a, b, Some("z".into())).unwrap();

		let dir = std::env::temp_dir().join("mega_ag_test_used_ids_clear");
		let inputs = vec![Argument::scalar("a", a), Argument::scalar("b", b)];
		let outputs = vec![Argument::scalar("z", c)];
		process_custom_task(&inputs, &outputs, &[], &dir).unwrap();

		let state = crate::builder::lock();
		assert!(state.used_ids.is_empty());
		assert!(state.graph.data().is_empty());
		assert!(state.graph.compute().is_empty());
	}
}
