//! [`ComputeNode`]: the operator tagged union.

use serde::Serialize;

/// Which rotation strategy a rotate-family [`ComputeNode`] compiles to
/// (spec Open Question: hoisted vs. hybrid rotation). `original_source`
/// hard-codes the choice at each call site; this crate exposes it as an
/// explicit argument instead, defaulting to [`RotationMode::Hybrid`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
	/// Decompose the rotation step into a sum of signed powers of two
	/// (NAF) and chain one key-switch per term ([`crate::rotate_cols`]).
	Hybrid,
	/// Single key-switch against the Galois key for the full step, no NAF
	/// decomposition ([`crate::advanced_rotate_cols`]).
	Hoisted,
}

/// Which plaintext representation a fused accumulate-family node consumes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum PlaintextKind {
	/// Operands are scheme-native `pt` plaintexts.
	#[serde(rename = "pt")]
	Plaintext,
	/// Operands are `pt_ringt` plaintexts, pre-scale-up.
	#[serde(rename = "pt_ringt")]
	PlaintextRingT,
}

/// Which backend library a rotation compute node targets (spec §3's
/// `RotateCol{step, lib}`/`RotateRow{lib}`). Only SEAL-generator rotations
/// carry a `lib` tag in the emitted graph; Lattigo rotations emit none.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lib {
	/// The default generator (Lattigo); left untagged on the wire.
	Lattigo,
	/// SEAL's generator; serializes as `"lib": "seal"`.
	Seal,
}

impl Lib {
	/// The value to store in a [`ComputeKind::RotateCol`]/
	/// [`ComputeKind::RotateRow`] `lib` field: `None` for Lattigo (emits no
	/// field at all), `Some` for SEAL (emits `"lib": "seal"`).
	pub fn tag(self) -> Option<SealLibTag> {
		match self {
			Lib::Lattigo => None,
			Lib::Seal => Some(SealLibTag),
		}
	}
}

/// Marker type that always serializes as the literal string `"seal"`
/// (`original_source`'s `seal_*` rotation functions set `"lib": "seal"`;
/// Lattigo rotations write no `lib` field at all, so there is no
/// corresponding Lattigo marker).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SealLibTag;

impl Serialize for SealLibTag {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str("seal")
	}
}

/// The operator a [`ComputeNode`] represents (spec §3's `ComputeNode`
/// table). Each variant names the operator's structural arguments only —
/// its operand and result edges live in the surrounding
/// [`crate::graph::Graph`], not on the node itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ComputeKind {
	/// Ciphertext-ciphertext or ciphertext-plaintext addition.
	#[serde(rename = "add")]
	Add,
	/// Ciphertext-ciphertext or ciphertext-plaintext subtraction.
	#[serde(rename = "sub")]
	Sub,
	/// Ciphertext negation.
	#[serde(rename = "neg")]
	Neg,
	/// Ciphertext-ciphertext or ciphertext-plaintext multiplication.
	#[serde(rename = "mult")]
	Mult,
	/// Relinearizes a degree-2 ciphertext back down to degree 1.
	#[serde(rename = "relin")]
	Relin,
	/// Drops the last prime from the ciphertext modulus (CKKS rescale).
	#[serde(rename = "rescale")]
	Rescale,
	/// Drops the ciphertext to an explicit target level without rescaling.
	#[serde(rename = "drop_level")]
	DropLevel {
		/// Level the output ciphertext lands on.
		target_level: i32,
	},
	/// RNS special-modulus decomposition of a ciphertext's first
	/// polynomial, the precursor step every key-switch consumes.
	#[serde(rename = "rns_sp_decomp")]
	RnsSpDecomp,
	/// Slot-wise column (Galois) rotation by `step` slots.
	#[serde(rename = "rotate_col")]
	RotateCol {
		/// Signed rotation amount, in slots.
		step: i32,
		/// Rotation strategy to compile this node to (not part of the
		/// emitted artifact; `original_source`'s `rot_type` is a dead local).
		#[serde(skip)]
		mode: RotationMode,
		/// Which backend library this rotation targets. Serialized only for
		/// [`Lib::Seal`]; Lattigo rotations emit no `lib` field at all.
		#[serde(rename = "lib", skip_serializing_if = "Option::is_none")]
		lib: Option<SealLibTag>,
	},
	/// Row-swap rotation (the conjugation automorphism).
	#[serde(rename = "rotate_row")]
	RotateRow {
		/// Rotation strategy to compile this node to (not part of the
		/// emitted artifact; `original_source`'s `rot_type` is a dead local).
		#[serde(skip)]
		mode: RotationMode,
		/// Which backend library this rotation targets. Serialized only for
		/// [`Lib::Seal`]; Lattigo rotations emit no `lib` field at all.
		#[serde(rename = "lib", skip_serializing_if = "Option::is_none")]
		lib: Option<SealLibTag>,
	},
	/// Converts a ciphertext or plaintext into NTT (evaluation) domain.
	#[serde(rename = "to_ntt")]
	ToNtt,
	/// Converts a ciphertext or plaintext out of NTT domain.
	#[serde(rename = "to_inv_ntt")]
	ToInvNtt,
	/// Converts a plaintext into Montgomery form.
	#[serde(rename = "to_mf")]
	ToMForm,
	/// Converts a scheme-native plaintext into "mul" form.
	#[serde(rename = "to_mul")]
	ToMul,
	/// Fused ciphertext-plaintext multiply-accumulate over `count` operand
	/// pairs, with a carry-reducing accumulation schedule.
	#[serde(rename = "cmpac_sum")]
	CmpacSum {
		/// Number of ciphertext-plaintext pairs folded into this node.
		#[serde(rename = "sum_cnt")]
		count: u32,
		/// Plaintext representation the operands are supplied in.
		#[serde(rename = "pt_type")]
		pt_kind: PlaintextKind,
		/// Per-slice compression metadata, present only when the plaintext
		/// operand is a blockwise-compressed `R_t` plaintext.
		#[serde(skip_serializing_if = "Option::is_none")]
		compressed_block_info: Option<Vec<serde_json::Value>>,
	},
	/// Plain accumulate over `count` ciphertext-plaintext products, with no
	/// fused multiply step (operands are already products).
	#[serde(rename = "cmp_sum")]
	CmpSum {
		/// Number of terms folded into this node.
		#[serde(rename = "sum_cnt")]
		count: u32,
		/// Plaintext representation the operands were supplied in.
		#[serde(rename = "pt_type")]
		pt_kind: PlaintextKind,
		/// Per-slice compression metadata, present only when the plaintext
		/// operand is a blockwise-compressed `R_t` plaintext.
		#[serde(skip_serializing_if = "Option::is_none")]
		compressed_block_info: Option<Vec<serde_json::Value>>,
	},
	/// CKKS bootstrap: raises a ciphertext back up to the scheme's top
	/// level, consuming the coeffs-to-slots / mod-reduce / slots-to-coeffs
	/// sub-circuit described by [`crate::param::BootstrapLevels`].
	#[serde(rename = "bootstrap")]
	Bootstrap,
}

/// An operator invocation in the graph: a shared header plus the
/// variant-specific payload in [`ComputeKind`].
#[derive(Debug, Clone, Serialize)]
pub struct ComputeNode {
	/// Stable identifier, random unless supplied by the caller.
	pub id: String,
	/// Monotonically increasing position in the graph's compute table.
	pub index: u32,
	/// The operator this node represents.
	#[serde(flatten)]
	pub kind: ComputeKind,
}

impl ComputeNode {
	/// Builds a compute node from its header and operator payload.
	pub fn new(id: String, index: u32, kind: ComputeKind) -> Self {
		Self { id, index, kind }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rotate_col_serializes_step_but_not_mode() {
		let node = ComputeNode::new(
			"x".into(),
			0,
			ComputeKind::RotateCol {
				step: -3,
				mode: RotationMode::Hoisted,
				lib: None,
			},
		);
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["type"], "rotate_col");
		assert_eq!(value["step"], -3);
		assert!(value.get("mode").is_none());
		assert!(value.get("lib").is_none());
	}

	#[test]
	fn rotate_col_emits_lib_seal_only_for_seal() {
		let node = ComputeNode::new(
			"x".into(),
			0,
			ComputeKind::RotateCol {
				step: 4,
				mode: RotationMode::Hybrid,
				lib: Lib::Seal.tag(),
			},
		);
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["lib"], "seal");
	}

	#[test]
	fn cmpac_sum_serializes_spec_field_names() {
		let node = ComputeNode::new(
			"x".into(),
			0,
			ComputeKind::CmpacSum {
				count: 4,
				pt_kind: PlaintextKind::PlaintextRingT,
				compressed_block_info: None,
			},
		);
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["sum_cnt"], 4);
		assert_eq!(value["pt_type"], "pt_ringt");
		assert!(value.get("count").is_none());
		assert!(value.get("pt_kind").is_none());
	}

	#[test]
	fn to_mform_serializes_as_to_mf() {
		let node = ComputeNode::new("x".into(), 0, ComputeKind::ToMForm);
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["type"], "to_mf");
	}

	#[test]
	fn drop_level_carries_target() {
		let node = ComputeNode::new("y".into(), 1, ComputeKind::DropLevel { target_level: 2 });
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["target_level"], 2);
	}
}
