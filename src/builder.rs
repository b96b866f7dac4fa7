//! The process-wide builder singleton (component D).
//!
//! `original_source` keeps its active parameter set, DAG, key table, and id
//! pool as module-level globals (`g_param`, `g_dag`, `g_swk_node_dict`,
//! `random_ids`) that every top-level operator function reaches into. A pure
//! Rust port without a language-level module-global equivalent needs an
//! explicit shared cell; `once_cell::sync::Lazy<Mutex<...>>` is the pattern
//! `wu-s-john-legit-poker` uses for its own process-wide encryption-key
//! cache, and we follow it here.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::key::KeyTable;
use crate::param::Param;

/// Everything one in-flight task accumulates: the active parameter set, the
/// DAG built so far, the key-deduplication table, and the pool of ids
/// already handed out.
#[derive(Default)]
pub(crate) struct BuilderState {
	pub(crate) param: Option<Param>,
	pub(crate) graph: Graph,
	pub(crate) keys: KeyTable,
	pub(crate) used_ids: HashSet<String>,
}

impl BuilderState {
	fn require_param(&self) -> Result<&Param> {
		self.param
			.as_ref()
			.ok_or_else(|| Error::ConfigError("set_fhe_param() must be called before building graph nodes".into()))
	}
}

static STATE: Lazy<Mutex<BuilderState>> = Lazy::new(|| Mutex::new(BuilderState::default()));

/// Locks the process-wide builder state.
///
/// Every public graph-building function in this crate goes through this
/// lock, so two threads building tasks concurrently serialize against each
/// other rather than interleave into the same graph (spec §5: the builder
/// is not designed for concurrent multi-task use).
pub(crate) fn lock() -> MutexGuard<'static, BuilderState> {
	STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Installs the active [`Param`] for the next task, and resets the DAG, key
/// table, and id pool to empty.
///
/// Must be called once before any graph-building operator (spec §4.1).
/// Calling it again starts a brand new task, discarding whatever graph was
/// under construction.
pub fn set_fhe_param(param: Param) {
	let mut state = lock();
	state.param = Some(param);
	state.graph.clear();
	state.keys.clear();
	state.used_ids.clear();
}

/// Returns a clone of the active [`Param`], or an error if
/// [`set_fhe_param`] has not been called yet.
pub(crate) fn active_param() -> Result<Param> {
	lock().require_param().cloned()
}

/// Allocates a fresh random id, or validates a caller-supplied one against
/// the task's used-id pool.
pub(crate) fn resolve_id(state: &mut BuilderState, requested: Option<String>) -> Result<String> {
	match requested {
		Some(id) => {
			if !state.used_ids.insert(id.clone()) {
				return Err(Error::ArgError(format!("id {id:?} is already in use")));
			}
			Ok(id)
		}
		None => Ok(crate::ids::fresh(&mut state.used_ids)),
	}
}
