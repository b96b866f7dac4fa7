//! Galois-group arithmetic: NAF step decomposition and the fixed rotation
//! lists CKKS bootstrap needs.
//!
//! Grounded directly on `original_source`'s `get_glk_col`,
//! `get_galois_element_for_column_rotation_by`,
//! `get_galois_element_for_row_rotation`, and
//! `get_rotations_for_bootstrapping`.

use crate::error::{Error, Result};

/// Lattigo's Galois generator.
pub const LATTIGO_GALOIS_GEN: u64 = 5;
/// SEAL's Galois generator.
pub const SEAL_GALOIS_GEN: u64 = 3;

/// Decomposes a column-rotation amount into signed powers of two (a
/// non-adjacent form), so a rotation by an arbitrary step can be
/// reassembled as a chain of power-of-two rotations.
///
/// Returns `(positive_step_log2s, negative_step_log2s)`: for each entry
/// `k` in the first list, rotate by `+2^k`; for each `k` in the second,
/// rotate by `-2^k`. `poly_degree` is the ring dimension `n`.
pub fn naf_column_steps(steps: i64, poly_degree: u64) -> (Vec<u32>, Vec<u32>) {
	let (r_pos, r_neg) = convert_to_naf(steps);
	let mask = (poly_degree >> 1).wrapping_sub(1);

	let mut pos_idx = Vec::new();
	for (idx, bit) in r_pos.iter().enumerate() {
		if !*bit {
			continue;
		}
		let step_idx = (r_pos.len() - idx - 1) as u32;
		let step = (1u64 << step_idx) & mask;
		if step == 0 {
			continue;
		}
		pos_idx.push(step_idx);
	}

	let mut neg_idx = Vec::new();
	for (idx, bit) in r_neg.iter().enumerate() {
		if !*bit {
			continue;
		}
		let step_idx = (r_neg.len() - idx - 1) as u32;
		neg_idx.push(step_idx);
	}

	(pos_idx, neg_idx)
}

/// Binary-vector non-adjacent form of `x`, MSB first, mirroring Python's
/// `bin(n)[2:]` string encoding of the positive/negative digit sets.
fn convert_to_naf(x: i64) -> (Vec<bool>, Vec<bool>) {
	let xh = x >> 1;
	let x3 = x + xh;
	let c = xh ^ x3;
	let n_pos = x3 & c;
	let n_neg = xh & c;
	(to_bits(n_pos), to_bits(n_neg))
}

fn to_bits(mut n: i64) -> Vec<bool> {
	if n == 0 {
		return vec![false];
	}
	let mut bits = Vec::new();
	while n > 0 {
		bits.push(n & 1 == 1);
		n >>= 1;
	}
	bits.reverse();
	bits
}

/// The Galois group element that realizes a column rotation by `rot`
/// slots, in a ring of dimension `poly_degree`, under generator
/// `galois_gen`.
pub fn galois_element_for_column_rotation(rot: i64, poly_degree: u64, galois_gen: u64) -> u64 {
	let modulus = poly_degree << 1;
	let exponent = rot.rem_euclid(modulus as i64) as u64;
	mod_pow(galois_gen, exponent, modulus)
}

/// The Galois group element that realizes row (conjugation) rotation, in a
/// ring of dimension `poly_degree`.
pub fn galois_element_for_row_rotation(poly_degree: u64) -> u64 {
	(poly_degree << 1) - 1
}

fn mod_pow(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
	let mut result: u128 = 1;
	let modulus = modulus as u128;
	base %= modulus as u64;
	let mut base = base as u128;
	while exp > 0 {
		if exp & 1 == 1 {
			result = (result * base) % modulus;
		}
		base = (base * base) % modulus;
		exp >>= 1;
	}
	result as u64
}

/// The fixed rotation-step list CKKS bootstrap needs for ring dimension
/// `poly_degree`. Only `n = 2^13` and `n = 2^16` have a built-in list.
pub fn rotations_for_bootstrapping(poly_degree: u64) -> Result<Vec<i64>> {
	match poly_degree {
		n if n == 1 << 13 => Ok(vec![
			1, 2, 3, 4, 8, 12, 16, 24, 32, 48, 64, 128, 192, 256, 512, 768, 1024, 2048, 3072, 3584, 3840, 3904, 3968,
			4032, 4064, 4080, 4084, 4088, 4092,
		]),
		n if n == 1 << 16 => Ok(vec![
			1, 2, 3, 4, 5, 6, 7, 8, 16, 24, 32, 64, 96, 128, 160, 192, 224, 256, 384, 512, 768, 1024, 1536, 2048, 3072,
			4096, 6144, 8192, 12288, 16384, 20480, 24576, 28672, 30720, 31232, 31744, 32000, 32256, 32512, 32640, 32672,
			32704, 32736, 32744, 32752, 32760, 32764,
		]),
		_ => Err(Error::NotSupported(format!(
			"no built-in bootstrap rotation list for poly_degree={poly_degree}"
		))),
	}
}
