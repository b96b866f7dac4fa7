//! Default parameter table, keyed by `scheme x n`.
//!
//! The table is baked into the binary with [`include_str!`], so its contents
//! are resolved relative to this source file's location at compile time —
//! there is no environment variable or CLI flag that can redirect it (spec
//! §6).

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::Scheme;

const TABLE_JSON: &str = include_str!("parameter.json");

#[derive(Debug, Deserialize)]
pub(crate) struct TableEntry {
	pub p: Vec<u64>,
	pub q: Vec<u64>,
	#[serde(default)]
	pub t: Option<u64>,
	pub max_level: u32,
}

#[derive(Debug, Deserialize)]
struct Table {
	#[serde(rename = "BFV", default)]
	bfv: HashMap<String, TableEntry>,
	#[serde(rename = "CKKS", default)]
	ckks: HashMap<String, TableEntry>,
}

/// Looks up the default parameter entry for `(scheme, n)`.
///
/// Fails with [`Error::ConfigError`] if the pair is not present in the
/// default table.
pub(crate) fn lookup(scheme: Scheme, n: u64) -> Result<TableEntry> {
	let table: Table = serde_json::from_str(TABLE_JSON).expect("built-in parameter table is valid JSON");

	let by_n = match scheme {
		Scheme::Bfv => table.bfv,
		Scheme::Ckks => table.ckks,
	};

	by_n.into_iter()
		.find(|(k, _)| k == &n.to_string())
		.map(|(_, v)| v)
		.ok_or_else(|| {
			Error::ConfigError(format!(
				"no default parameters for scheme {scheme:?} at n={n}"
			))
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_pairs_resolve() {
		assert!(lookup(Scheme::Bfv, 8192).is_ok());
		assert!(lookup(Scheme::Ckks, 16384).is_ok());
	}

	#[test]
	fn unknown_pair_is_config_error() {
		let err = lookup(Scheme::Bfv, 4096).unwrap_err();
		assert!(matches!(err, Error::ConfigError(_)));
	}

	#[test]
	fn bfv_entries_carry_plaintext_modulus() {
		let entry = lookup(Scheme::Bfv, 8192).unwrap();
		assert!(entry.t.is_some());
		assert_eq!(entry.max_level as usize, entry.q.len() - 1);
	}
}
