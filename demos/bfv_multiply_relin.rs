//! Builds a tiny BFV task: two fresh ciphertexts, a multiply, a
//! relinearization, and the `mega_ag.json`/`task_signature.json` pair that
//! `process_custom_task` emits for it.

use mega_ag::{mult_relin, new_ciphertext, process_custom_task, set_fhe_param, Argument, Param};

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt::init();

	set_fhe_param(Param::bfv_default(8192)?);

	let x = new_ciphertext(3, Some("x".into()))?;
	let y = new_ciphertext(3, Some("y".into()))?;
	let z = mult_relin(x, y, Some("z".into()))?;

	let inputs = vec![Argument::scalar("x", x), Argument::scalar("y", y)];
	let outputs = vec![Argument::scalar("z", z)];

	let out_dir = std::env::temp_dir().join("mega_ag_demo_bfv_multiply_relin");
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
