//! The FHE parameter model (component A).
//!
//! A [`Param`] is an immutable description of a BFV or CKKS instance: scheme,
//! ring dimension, ciphertext- and special-modulus chains, and the
//! scheme-specific extras (`t` for BFV, `scale` and bootstrap checkpoints for
//! CKKS). Build one with a default constructor (backed by the built-in
//! [`table`]) or a custom constructor, then pass it to [`crate::set_fhe_param`]
//! once before building a graph.

mod bfv;
mod ckks;
mod table;

pub use bfv::BfvParamBuilder;
pub use ckks::CkksParamBuilder;

use serde::Serialize;

use crate::error::{Error, Result};

/// The FHE scheme a [`Param`] (and therefore a whole task) is built for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub enum Scheme {
	/// Brakerski/Fan-Vercauteren scheme (exact integer arithmetic).
	Bfv,
	/// Cheon-Kim-Kim-Song scheme (approximate fixed-point arithmetic).
	Ckks,
}

/// The four inner level checkpoints a CKKS bootstrap sub-circuit needs.
///
/// Meaningful only when [`Param::scheme`] is [`Scheme::Ckks`] and the task
/// actually uses [`crate::bootstrap`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapLevels {
	/// Level at which the coeffs-to-slots step starts.
	pub cts_start: u32,
	/// Level at which homomorphic mod-reduction starts.
	pub eval_mod_start: u32,
	/// Level at which the slots-to-coeffs step starts.
	pub stc_start: u32,
	/// Level of the ciphertext produced by `bootstrap`.
	pub output: u32,
}

/// An immutable collection of parameters that defines an FHE scheme instance.
///
/// `scale`, `t`, and the bootstrap checkpoints are meaningful only for the
/// matching scheme (spec §3): `t` is BFV-only, `scale` and
/// [`BootstrapLevels`] are CKKS-only.
#[derive(Debug, Clone, Serialize)]
pub struct Param {
	scheme: Scheme,
	n: u64,
	q: Vec<u64>,
	p: Vec<u64>,
	t: Option<u64>,
	max_level: u32,
	scale: Option<f64>,
	bootstrap: Option<BootstrapLevels>,
}

impl Param {
	fn new(scheme: Scheme, n: u64, q: Vec<u64>, p: Vec<u64>, t: Option<u64>) -> Result<Self> {
		if q.is_empty() {
			return Err(Error::ConfigError(
				"coefficient modulus chain q must not be empty".into(),
			));
		}
		if p.is_empty() {
			return Err(Error::ConfigError(
				"special modulus chain p must not be empty".into(),
			));
		}
		let max_level = (q.len() - 1) as u32;
		Ok(Self {
			scheme,
			n,
			q,
			p,
			t,
			max_level,
			scale: None,
			bootstrap: None,
		})
	}

	/// Loads the default BFV parameters for ring dimension `n` from the
	/// built-in table (spec §4.1).
	pub fn bfv_default(n: u64) -> Result<Self> {
		let entry = table::lookup(Scheme::Bfv, n)?;
		Self::new(Scheme::Bfv, n, entry.q, entry.p, entry.t)
	}

	/// Loads the default CKKS parameters for ring dimension `n` from the
	/// built-in table.
	pub fn ckks_default(n: u64) -> Result<Self> {
		let entry = table::lookup(Scheme::Ckks, n)?;
		Self::new(Scheme::Ckks, n, entry.q, entry.p, None)
	}

	/// Builds BFV parameters from caller-supplied moduli chains.
	pub fn bfv_custom(n: u64, q: Vec<u64>, p: Vec<u64>, t: u64) -> Result<Self> {
		Self::new(Scheme::Bfv, n, q, p, Some(t))
	}

	/// Builds CKKS parameters from caller-supplied moduli chains.
	pub fn ckks_custom(n: u64, q: Vec<u64>, p: Vec<u64>) -> Result<Self> {
		Self::new(Scheme::Ckks, n, q, p, None)
	}

	/// Sets the CKKS scaling factor. No-op data on BFV parameters (the field
	/// is simply unused by BFV operators).
	pub fn with_scale(mut self, scale: f64) -> Self {
		self.scale = Some(scale);
		self
	}

	/// Attaches CKKS-bootstrap level checkpoints to this parameter set.
	pub fn with_bootstrap_levels(mut self, levels: BootstrapLevels) -> Self {
		self.bootstrap = Some(levels);
		self
	}

	/// A toy CKKS-bootstrap parameter set at `n=8192` (ring `N16QP1546H192H32`
	/// scaled down), suitable for tests and documentation examples.
	pub fn ckks_btp_toy() -> Self {
		ckks::btp_toy()
	}

	/// The production-scale CKKS-bootstrap parameter set at `n=65536`.
	pub fn ckks_btp_default() -> Self {
		ckks::btp_default()
	}

	/// The FHE scheme this parameter set was built for.
	pub fn scheme(&self) -> Scheme {
		self.scheme
	}

	/// The polynomial ring dimension.
	pub fn n(&self) -> u64 {
		self.n
	}

	/// The ciphertext-modulus prime chain.
	pub fn q(&self) -> &[u64] {
		&self.q
	}

	/// The special-modulus prime chain, used for key-switching.
	pub fn p(&self) -> &[u64] {
		&self.p
	}

	/// The plaintext modulus, if this is a BFV parameter set.
	pub fn t(&self) -> Option<u64> {
		self.t
	}

	/// The highest level a fresh ciphertext can carry: `|q| - 1`.
	pub fn max_level(&self) -> u32 {
		self.max_level
	}

	/// The CKKS scaling factor, if one was attached.
	pub fn scale(&self) -> Option<f64> {
		self.scale
	}

	/// The CKKS bootstrap checkpoints, if this parameter set carries them.
	pub fn bootstrap_levels(&self) -> Option<BootstrapLevels> {
		self.bootstrap
	}

	/// `|p| - 1`: special-modulus level always bound on key material.
	pub fn get_max_sp_level(&self) -> u32 {
		(self.p.len() - 1) as u32
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_bfv_matches_table() {
		let p = Param::bfv_default(8192).unwrap();
		assert_eq!(p.scheme(), Scheme::Bfv);
		assert_eq!(p.max_level(), (p.q().len() - 1) as u32);
		assert!(p.t().is_some());
	}

	#[test]
	fn custom_rejects_empty_chains() {
		assert!(matches!(
			Param::bfv_custom(8192, vec![], vec![1], 65537),
			Err(Error::ConfigError(_))
		));
		assert!(matches!(
			Param::bfv_custom(8192, vec![1], vec![], 65537),
			Err(Error::ConfigError(_))
		));
	}

	#[test]
	fn get_max_sp_level_tracks_p_len() {
		let p = Param::bfv_custom(8192, vec![1, 2, 3], vec![4, 5], 65537).unwrap();
		assert_eq!(p.get_max_sp_level(), 1);
	}

	#[test]
	fn btp_toy_carries_checkpoints() {
		let p = Param::ckks_btp_toy();
		assert_eq!(p.scheme(), Scheme::Ckks);
		let btp = p.bootstrap_levels().unwrap();
		assert_eq!(btp.output, 9);
	}
}
