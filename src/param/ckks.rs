//! Fluent builder for custom CKKS [`Param`](super::Param)s, and the two
//! hard-coded CKKS-bootstrap parameter sets carried over from
//! `original_source`'s `CkksBtpParam`.

use crate::error::{Error, Result};

use super::{BootstrapLevels, Param};

/// Builds a custom CKKS [`Param`] from caller-supplied moduli chains.
#[derive(Debug, Default)]
pub struct CkksParamBuilder {
	n: Option<u64>,
	q: Option<Vec<u64>>,
	p: Option<Vec<u64>>,
	scale: Option<f64>,
	bootstrap: Option<BootstrapLevels>,
}

impl CkksParamBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the polynomial ring dimension. Must be a power of two.
	pub fn set_n(mut self, n: u64) -> Self {
		self.n = Some(n);
		self
	}

	/// Sets the ciphertext-modulus prime chain.
	pub fn set_coefficient_modulus(mut self, q: Vec<u64>) -> Self {
		self.q = Some(q);
		self
	}

	/// Sets the special-modulus prime chain used for key-switching.
	pub fn set_special_modulus(mut self, p: Vec<u64>) -> Self {
		self.p = Some(p);
		self
	}

	/// Sets the fixed-point scaling factor applied at encoding time.
	pub fn set_scale(mut self, scale: f64) -> Self {
		self.scale = Some(scale);
		self
	}

	/// Attaches CKKS-bootstrap level checkpoints.
	pub fn set_bootstrap_levels(mut self, levels: BootstrapLevels) -> Self {
		self.bootstrap = Some(levels);
		self
	}

	/// Validates the choices made so far and builds the [`Param`].
	pub fn build(self) -> Result<Param> {
		let n = self
			.n
			.ok_or_else(|| Error::ConfigError("poly modulus degree not set".into()))?;
		let q = self
			.q
			.ok_or_else(|| Error::ConfigError("coefficient modulus not set".into()))?;
		let p = self
			.p
			.ok_or_else(|| Error::ConfigError("special modulus not set".into()))?;

		let mut param = Param::ckks_custom(n, q, p)?;
		if let Some(scale) = self.scale {
			param = param.with_scale(scale);
		}
		if let Some(levels) = self.bootstrap {
			param = param.with_bootstrap_levels(levels);
		}
		Ok(param)
	}
}

/// `N16QP1546H192H32` scaled down to `n=8192`, for tests and documentation.
pub(super) fn btp_toy() -> Param {
	btp_param(8192, toy_q(), toy_p())
}

/// The production-scale `N16QP1546H192H32` parameter set at `n=65536`.
pub(super) fn btp_default() -> Param {
	btp_param(1 << 16, toy_q(), toy_p())
}

fn btp_param(n: u64, q: Vec<u64>, p: Vec<u64>) -> Param {
	Param::ckks_custom(n, q, p)
		.expect("hard-coded bootstrap moduli chains are non-empty")
		.with_scale(2f64.powi(40))
		.with_bootstrap_levels(BootstrapLevels {
			cts_start: 24,
			eval_mod_start: 20,
			stc_start: 12,
			output: 9,
		})
}

fn toy_q() -> Vec<u64> {
	vec![
		0x10000000006E0001,
		0x10000140001,
		0xFFFFE80001,
		0xFFFFC40001,
		0x100003E0001,
		0xFFFFB20001,
		0x10000500001,
		0xFFFF940001,
		0xFFFF8A0001,
		0xFFFF820001,
		0x7FFFE60001,
		0x7FFFE40001,
		0x7FFFE00001,
		0xFFFFFFFFF840001,
		0x1000000000860001,
		0xFFFFFFFFF6A0001,
		0x1000000000980001,
		0xFFFFFFFFF5A0001,
		0x1000000000B00001,
		0x1000000000CE0001,
		0xFFFFFFFFF2A0001,
		0x100000000060001,
		0xFFFFFFFFF00001,
		0xFFFFFFFFD80001,
		0x1000000002A0001,
	]
}

fn toy_p() -> Vec<u64> {
	vec![
		0x1FFFFFFFFFE00001,
		0x1FFFFFFFFFC80001,
		0x1FFFFFFFFFB40001,
		0x1FFFFFFFFF500001,
		0x1FFFFFFFFF420001,
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_round_trips_fields() {
		let param = CkksParamBuilder::new()
			.set_n(16384)
			.set_coefficient_modulus(vec![1, 2, 3])
			.set_special_modulus(vec![4])
			.set_scale(2f64.powi(30))
			.build()
			.unwrap();

		assert_eq!(param.n(), 16384);
		assert_eq!(param.scale(), Some(2f64.powi(30)));
	}

	#[test]
	fn toy_and_default_share_checkpoints() {
		let toy = btp_toy();
		let full = btp_default();
		assert_eq!(toy.bootstrap_levels(), full.bootstrap_levels());
		assert_eq!(toy.n(), 8192);
		assert_eq!(full.n(), 65536);
	}
}
