//! Random node identifiers.
//!
//! Every [`crate::node::DataNode`]/[`crate::node::ComputeNode`] needs a
//! stable `id` distinct from every other node's, whether the caller supplies
//! one or not. `original_source` draws random 12-character lowercase ids and
//! re-draws on collision; we do the same, tracked against the builder's
//! per-task used-id set (spec §4.2, "Key deduplication").

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

const ID_LEN: usize = 12;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Draws a fresh 12-character lowercase id not already present in `used`.
///
/// Inserts the returned id into `used` before returning it.
pub(crate) fn fresh(used: &mut std::collections::HashSet<String>) -> String {
	let between = Uniform::from(0..ALPHABET.len());
	let mut rng = rand::thread_rng();
	loop {
		let id = random_id(&mut rng, &between);
		if used.insert(id.clone()) {
			return id;
		}
	}
}

fn random_id<R: Rng>(rng: &mut R, between: &Uniform<usize>) -> String {
	(0..ID_LEN)
		.map(|_| ALPHABET[between.sample(rng)] as char)
		.collect()
}
