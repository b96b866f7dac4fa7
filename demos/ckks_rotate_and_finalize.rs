//! Builds a CKKS task that rotates a ciphertext's slots by two steps and
//! finalizes it, demonstrating the NAF-chained `rotate_cols` compiler and
//! the shared Galois-key deduplication it drives.

use mega_ag::node::Lib;
use mega_ag::{new_ciphertext, process_custom_task, rotate_cols, set_fhe_param, Argument, Param, LATTIGO_GALOIS_GEN};

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt::init();

	set_fhe_param(Param::ckks_default(16384)?);

	let x = new_ciphertext(3, Some("x".into()))?;
	let rotated = rotate_cols(x, &[1, 3], Some("x_rot".into()), LATTIGO_GALOIS_GEN, Lib::Lattigo)?;

	let inputs = vec![Argument::scalar("x", x)];
	let outputs = vec![Argument::vector("x_rot", rotated)];

	let out_dir = std::env::temp_dir().join("mega_ag_demo_ckks_rotate_and_finalize");
	let mag = process_custom_task(&inputs, &outputs, &[], &out_dir)?;

	tracing::info!(
		algorithm = %mag.algorithm,
		data_nodes = mag.data.len(),
		compute_nodes = mag.compute.len(),
		"wrote task artifacts to {}",
		out_dir.display(),
	);
	Ok(())
}
