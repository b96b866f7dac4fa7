//! Fluent builder for custom BFV [`Param`](super::Param)s.

use crate::error::{Error, Result};

use super::Param;

/// Builds a custom BFV [`Param`] from caller-supplied moduli chains.
///
/// Prefer [`Param::bfv_default`](super::Param::bfv_default) when the ring
/// dimension has a built-in table entry; reach for this builder when you
/// need parameters outside that table.
#[derive(Debug, Default)]
pub struct BfvParamBuilder {
	n: Option<u64>,
	q: Option<Vec<u64>>,
	p: Option<Vec<u64>>,
	t: Option<u64>,
}

impl BfvParamBuilder {
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

	/// Sets the plaintext modulus.
	pub fn set_plain_modulus(mut self, t: u64) -> Self {
		self.t = Some(t);
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
		let t = self
			.t
			.ok_or_else(|| Error::ConfigError("plain modulus not set".into()))?;
		Param::bfv_custom(n, q, p, t)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_round_trips_fields() {
		let param = BfvParamBuilder::new()
			.set_n(8192)
			.set_coefficient_modulus(vec![1, 2, 3])
			.set_special_modulus(vec![4])
			.set_plain_modulus(65537)
			.build()
			.unwrap();

		assert_eq!(param.n(), 8192);
		assert_eq!(param.q(), &[1, 2, 3]);
		assert_eq!(param.t(), Some(65537));
	}

	#[test]
	fn builder_requires_every_field() {
		assert!(BfvParamBuilder::new().build().is_err());
	}
}
