//! A computation-graph builder and compiler front-end for FHE tasks.
//!
//! Call [`set_fhe_param`] once with a BFV or CKKS [`Param`], build a graph
//! with the operator functions in [`ops`] (re-exported at the crate root),
//! then call [`process_custom_task`] to validate the graph against its
//! declared inputs/outputs and emit `mega_ag.json`/`task_signature.json`.
//!
//! ```no_run
//! use mega_ag::{mult_relin, new_ciphertext, process_custom_task, set_fhe_param, Argument, Param};
//!
//! set_fhe_param(Param::bfv_default(8192).unwrap());
//! let x = new_ciphertext(3, Some("x".into())).unwrap();
//! let y = new_ciphertext(3, Some("y".into())).unwrap();
//! let z = mult_relin(x, y, Some("z".into())).unwrap();
//!
//! let inputs = vec![Argument::scalar("x", x), Argument::scalar("y", y)];
//! let outputs = vec![Argument::scalar("z", z)];
//! process_custom_task(&inputs, &outputs, &[], std::path::Path::new("/tmp/task")).unwrap();
//! ```

mod argument;
mod builder;
mod error;
mod finalize;
mod galois;
mod graph;
mod ids;
mod key;
pub mod node;
pub mod ops;
pub mod param;

pub use argument::{Argument, ArgumentData};
pub use builder::set_fhe_param;
pub use error::{Error, Result};
pub use finalize::{process_custom_task, MegaAg};
pub use galois::{LATTIGO_GALOIS_GEN, SEAL_GALOIS_GEN};
pub use graph::{Edge, EdgeEndpoint, Graph};
pub use ops::*;
pub use param::{BfvParamBuilder, BootstrapLevels, CkksParamBuilder, Param, Scheme};
