//! Error taxonomy for the graph builder, mirrored from spec §7.

use static_assertions::const_assert;

/// All errors the builder's public API can return.
///
/// Every variant corresponds to one row of the error taxonomy table: operator
/// misuse surfaces as [`Error::TypeMismatch`], configuration problems as
/// [`Error::ConfigError`], and so on. No error is recovered internally —
/// every failure is surfaced to the caller, and a failing operator never
/// leaves a partial node inserted in the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// An operator was called before [`crate::set_fhe_param`], or the
	/// requested `(scheme, n)` pair has no default parameter table entry.
	#[error("configuration error: {0}")]
	ConfigError(String),

	/// Operand variants, NTT/Montgomery flags, or levels are not compatible
	/// with the requested operator.
	#[error("type mismatch: {0}")]
	TypeMismatch(String),

	/// An [`crate::Argument`] was malformed, or two arguments share an id.
	#[error("argument error: {0}")]
	ArgError(String),

	/// [`crate::process_custom_task`] found an unused input, a dangling
	/// interior node, or a duplicate index.
	#[error("graph error: {0}")]
	GraphError(String),

	/// A level argument (`drop_level`, `bootstrap`) is out of the admissible
	/// range for the current node or parameters.
	#[error("range error: {0}")]
	RangeError(String),

	/// `bootstrap` was called with a ring dimension that has no hard-coded
	/// rotation set.
	#[error("not supported: {0}")]
	NotSupported(String),

	/// Writing `mega_ag.json`/`task_signature.json` failed.
	#[error("I/O error: {0}")]
	Io(String),
}

const_assert!(std::mem::size_of::<Error>() <= 32);

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
