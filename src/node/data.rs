//! [`DataNode`]: the plaintext/ciphertext/key-material tagged union.

use serde::Serialize;
use serde_json::Value;

use crate::param::Scheme;

/// The variant-specific payload of a [`DataNode`] (spec §3's `DataNode`
/// table, collapsed to one tag per row).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DataKind {
	/// A scheme-native plaintext (`pt`).
	#[serde(rename = "pt")]
	Plaintext,
	/// A BFV plaintext still in the `R_t` ring, pre-scale-up (`pt_ringt`).
	#[serde(rename = "pt_ringt")]
	PlaintextRingT,
	/// A blockwise-compressed `R_t` plaintext (`pt_ringt` with
	/// `is_compressed`), carrying the opaque per-block descriptors produced
	/// by the caller's compression step.
	#[serde(rename = "pt_ringt")]
	CompressedPlaintextRingT {
		/// Opaque per-block compression metadata, passed through unchanged
		/// to the consuming compute node (`ct_pt_mult_accumulate`'s
		/// `compressed_block_info`); not part of the data record itself
		/// (spec §3: data record carries `is_compressed?`, the compute
		/// record carries `compressed_block_info`).
		#[serde(skip)]
		compressed_block_info: Vec<Value>,
		/// Always `true`; marks the plaintext blockwise-compressed, mirroring
		/// `original_source`'s `data[i]['is_compressed'] = True`.
		is_compressed: bool,
	},
	/// A plaintext pre-converted to Montgomery / "mul" form for
	/// ciphertext-plaintext multiplication (`pt_mul`).
	#[serde(rename = "pt_mul")]
	PlaintextMul,
	/// A fresh or evaluated 2-polynomial ciphertext (`ct`).
	#[serde(rename = "ct")]
	Ciphertext {
		/// Whether the first polynomial has already been RNS/special-modulus
		/// decomposed (an intermediate state [`crate::ops::rns_sp_decomp`]
		/// produces and [`crate::ops::relin`] consumes).
		poly1_rns_sp_decomped: bool,
	},
	/// A degree-2 ciphertext awaiting relinearization (`ct3`).
	#[serde(rename = "ct3")]
	Ciphertext3,
	/// Key-switching key for BFV/CKKS key-switch-style rotations (`swk`).
	#[serde(rename = "swk")]
	SwitchKey,
	/// Relinearization key (`rlk`).
	#[serde(rename = "rlk")]
	RelinKey,
	/// Galois (rotation/conjugation) key (`glk`).
	#[serde(rename = "glk")]
	GaloisKey {
		/// The Galois group element this key switches by.
		galois_element: u64,
	},
}

/// A data value flowing through the graph: a plaintext, a ciphertext, or a
/// piece of key material, tagged with the FHE attributes every consumer
/// needs to validate an operand (spec §3, "Invariants").
#[derive(Debug, Clone, Serialize)]
pub struct DataNode {
	/// Stable identifier, random unless supplied by the caller.
	pub id: String,
	/// Monotonically increasing position in the graph's data table.
	pub index: u32,
	/// Current ciphertext-modulus level (number of primes still present).
	pub level: i32,
	/// Polynomial degree: 1 for plaintexts and fresh ciphertexts, 2 for
	/// un-relinearized products, 0 for key material.
	pub degree: i32,
	/// Whether the underlying polynomials are in NTT (evaluation) domain.
	pub is_ntt: bool,
	/// Whether the underlying polynomials are in Montgomery form.
	pub is_mform: bool,
	/// Special-modulus level, meaningful only on key material.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sp_level: Option<u32>,
	/// The variant-specific payload.
	#[serde(flatten)]
	pub kind: DataKind,
}

impl DataNode {
	/// A fresh scheme-native plaintext at `level`.
	pub fn plaintext(scheme: Scheme, id: String, index: u32, level: i32) -> Self {
		Self {
			id,
			index,
			level,
			degree: 1,
			is_ntt: scheme == Scheme::Ckks,
			is_mform: false,
			sp_level: None,
			kind: DataKind::Plaintext,
		}
	}

	/// A BFV plaintext in the `R_t` ring, not yet scaled up.
	pub fn plaintext_ringt(id: String, index: u32) -> Self {
		Self {
			id,
			index,
			level: 0,
			degree: 1,
			is_ntt: false,
			is_mform: false,
			sp_level: None,
			kind: DataKind::PlaintextRingT,
		}
	}

	/// A blockwise-compressed `R_t` plaintext.
	pub fn compressed_plaintext_ringt(id: String, index: u32, compressed_block_info: Vec<Value>) -> Self {
		Self {
			id,
			index,
			level: 0,
			degree: 1,
			is_ntt: false,
			is_mform: false,
			sp_level: None,
			kind: DataKind::CompressedPlaintextRingT {
				compressed_block_info,
				is_compressed: true,
			},
		}
	}

	/// A plaintext pre-converted to "mul" form, at `level`.
	pub fn plaintext_mul(id: String, index: u32, level: i32) -> Self {
		Self {
			id,
			index,
			level,
			degree: 1,
			is_ntt: true,
			is_mform: true,
			sp_level: None,
			kind: DataKind::PlaintextMul,
		}
	}

	/// A fresh ciphertext at `level`, with the scheme's default NTT domain.
	pub fn ciphertext(scheme: Scheme, id: String, index: u32, level: i32) -> Self {
		Self {
			id,
			index,
			level,
			degree: 1,
			is_ntt: scheme == Scheme::Ckks,
			is_mform: false,
			sp_level: None,
			kind: DataKind::Ciphertext {
				poly1_rns_sp_decomped: false,
			},
		}
	}

	/// A degree-2 ciphertext produced by an un-relinearized multiplication.
	pub fn ciphertext3(scheme: Scheme, id: String, index: u32, level: i32) -> Self {
		Self {
			id,
			index,
			level,
			degree: 2,
			is_ntt: scheme == Scheme::Ckks,
			is_mform: false,
			sp_level: None,
			kind: DataKind::Ciphertext3,
		}
	}

	/// Key-switching key material at `(level, sp_level)`.
	pub fn switch_key(id: String, index: u32, level: i32, sp_level: u32) -> Self {
		Self {
			id,
			index,
			level,
			degree: 0,
			is_ntt: true,
			is_mform: false,
			sp_level: Some(sp_level),
			kind: DataKind::SwitchKey,
		}
	}

	/// Relinearization key material at `(level, sp_level)`.
	pub fn relin_key(id: String, index: u32, level: i32, sp_level: u32) -> Self {
		Self {
			id,
			index,
			level,
			degree: 0,
			is_ntt: true,
			is_mform: false,
			sp_level: Some(sp_level),
			kind: DataKind::RelinKey,
		}
	}

	/// Galois key material at `(level, sp_level)` for the given group
	/// element.
	pub fn galois_key(id: String, index: u32, level: i32, sp_level: u32, galois_element: u64) -> Self {
		Self {
			id,
			index,
			level,
			degree: 0,
			is_ntt: true,
			is_mform: false,
			sp_level: Some(sp_level),
			kind: DataKind::GaloisKey { galois_element },
		}
	}

	/// Whether this node carries ciphertext (as opposed to plaintext or key
	/// material) data.
	pub fn is_ciphertext(&self) -> bool {
		matches!(self.kind, DataKind::Ciphertext { .. } | DataKind::Ciphertext3)
	}

	/// The `type` tag this node serializes under (`"ct"`, `"pt"`, ...).
	pub fn type_tag(&self) -> &'static str {
		match &self.kind {
			DataKind::Plaintext => "pt",
			DataKind::PlaintextRingT | DataKind::CompressedPlaintextRingT { .. } => "pt_ringt",
			DataKind::PlaintextMul => "pt_mul",
			DataKind::Ciphertext { .. } => "ct",
			DataKind::Ciphertext3 => "ct3",
			DataKind::SwitchKey => "swk",
			DataKind::RelinKey => "rlk",
			DataKind::GaloisKey { .. } => "glk",
		}
	}

	/// Whether this node is key material (switch, relin, or Galois key).
	pub fn is_key(&self) -> bool {
		matches!(
			self.kind,
			DataKind::SwitchKey | DataKind::RelinKey | DataKind::GaloisKey { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bfv_plaintext_is_not_ntt() {
		let pt = DataNode::plaintext(Scheme::Bfv, "a".into(), 0, 3);
		assert!(!pt.is_ntt);
		assert_eq!(pt.degree, 1);
	}

	#[test]
	fn ckks_ciphertext_defaults_to_ntt() {
		let ct = DataNode::ciphertext(Scheme::Ckks, "b".into(), 1, 5);
		assert!(ct.is_ntt);
		assert!(ct.is_ciphertext());
	}

	#[test]
	fn ciphertext3_carries_degree_two() {
		let ct3 = DataNode::ciphertext3(Scheme::Bfv, "c".into(), 2, 4);
		assert_eq!(ct3.degree, 2);
		assert!(ct3.is_ciphertext());
	}

	#[test]
	fn key_material_is_not_ciphertext() {
		let rlk = DataNode::relin_key("d".into(), 3, 4, 1);
		assert!(rlk.is_key());
		assert!(!rlk.is_ciphertext());
		assert_eq!(rlk.sp_level, Some(1));
	}

	#[test]
	fn serializes_with_flattened_type_tag() {
		let ct = DataNode::ciphertext(Scheme::Bfv, "e".into(), 4, 2);
		let value = serde_json::to_value(&ct).unwrap();
		assert_eq!(value["type"], "ct");
		assert_eq!(value["poly1_rns_sp_decomped"], false);
	}

	#[test]
	fn compressed_plaintext_ringt_emits_is_compressed_not_block_info() {
		let blocks = vec![serde_json::json!({"offset": 0})];
		let node = DataNode::compressed_plaintext_ringt("f".into(), 5, blocks);
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["type"], "pt_ringt");
		assert_eq!(value["is_compressed"], true);
		assert!(value.get("compressed_block_info").is_none());
	}
}
