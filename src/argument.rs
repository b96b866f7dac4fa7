//! [`Argument`]: a named, possibly-nested tensor of data-node indices,
//! the unit [`crate::finalize::process_custom_task`] takes as input,
//! output, and offline-input declarations.
//!
//! Grounded on `original_source`'s `Argument` class and the
//! `flatten`/`shape` helpers `process_custom_task` closes over.

/// A named argument: an id plus a (possibly nested) tensor of data-node
/// indices.
#[derive(Debug, Clone)]
pub struct Argument {
	/// The argument's id, unique among all arguments passed to one
	/// [`crate::finalize::process_custom_task`] call.
	pub id: String,
	/// The argument's data, a scalar node or nested list of nodes.
	pub data: ArgumentData,
}

/// A (possibly nested) tensor of data-node indices.
#[derive(Debug, Clone)]
pub enum ArgumentData {
	/// A single data-node index.
	Node(u32),
	/// A nested list of argument data, one level deeper.
	List(Vec<ArgumentData>),
}

impl Argument {
	/// A scalar argument wrapping a single data-node index.
	pub fn scalar(id: impl Into<String>, index: u32) -> Self {
		Self {
			id: id.into(),
			data: ArgumentData::Node(index),
		}
	}

	/// A vector argument wrapping a flat list of data-node indices.
	pub fn vector(id: impl Into<String>, indices: impl IntoIterator<Item = u32>) -> Self {
		Self {
			id: id.into(),
			data: ArgumentData::List(indices.into_iter().map(ArgumentData::Node).collect()),
		}
	}

	/// Every leaf data-node index, in depth-first left-to-right order.
	pub fn flatten(&self) -> Vec<u32> {
		self.data.flatten()
	}

	/// The nested-list shape of this argument's data, outermost dimension
	/// first. A scalar argument has an empty shape.
	pub fn shape(&self) -> Vec<usize> {
		self.data.shape()
	}
}

impl ArgumentData {
	fn flatten(&self) -> Vec<u32> {
		match self {
			ArgumentData::Node(index) => vec![*index],
			ArgumentData::List(items) => items.iter().flat_map(ArgumentData::flatten).collect(),
		}
	}

	fn shape(&self) -> Vec<usize> {
		match self {
			ArgumentData::Node(_) => Vec::new(),
			ArgumentData::List(items) => {
				let mut dims = vec![items.len()];
				if let Some(first) = items.first() {
					dims.extend(first.shape());
				}
				dims
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scalar_argument_has_empty_shape() {
		let arg = Argument::scalar("x", 3);
		assert_eq!(arg.shape(), Vec::<usize>::new());
		assert_eq!(arg.flatten(), vec![3]);
	}

	#[test]
	fn vector_argument_reports_its_length() {
		let arg = Argument::vector("w", vec![1, 2, 3]);
		assert_eq!(arg.shape(), vec![3]);
		assert_eq!(arg.flatten(), vec![1, 2, 3]);
	}

	#[test]
	fn nested_argument_reports_a_two_dimensional_shape() {
		let arg = Argument {
			id: "m".into(),
			data: ArgumentData::List(vec![
				ArgumentData::List(vec![ArgumentData::Node(0), ArgumentData::Node(1)]),
				ArgumentData::List(vec![ArgumentData::Node(2), ArgumentData::Node(3)]),
			]),
		};
		assert_eq!(arg.shape(), vec![2, 2]);
		assert_eq!(arg.flatten(), vec![0, 1, 2, 3]);
	}
}
