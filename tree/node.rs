use ndarray::prelude::*;
use suinz_model::{check_example, enum_index, normalize, Model, PredictError};

/// A trained tree, ready to predict.
#[derive(Clone, Debug)]
pub struct Tree {
	pub root: Node,
	pub n_attributes: usize,
	pub n_classes: usize,
}

/** A `Node` is one of two types:
1. **Branch**: A `BranchNode` sends examples to one of its children by the value of one attribute.
2. **Leaf**: A `LeafNode` holds the class counts of the training examples that reached it.
*/
#[derive(Clone, Debug)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

#[derive(Clone, Debug)]
pub struct BranchNode {
	pub split: BranchSplit,
	pub children: Vec<Node>,
	/// The fraction of the training weight with a known value that went to each child. Examples with a missing value go down every branch weighted by these fractions.
	pub branch_weights: Vec<f64>,
	/// The weighted class counts of the training examples that reached this node.
	pub class_counts: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct LeafNode {
	/// The weighted class counts of the training examples that reached this leaf. A leaf that no training examples reached predicts its parent's distribution.
	pub class_counts: Vec<f64>,
}

#[derive(Clone, Debug)]
pub enum BranchSplit {
	Continuous(BranchSplitContinuous),
	Discrete(BranchSplitDiscrete),
}

/// Examples with a value less than or equal to `split_value` go to the first child and the rest go to the second.
#[derive(Clone, Debug)]
pub struct BranchSplitContinuous {
	pub attribute_index: usize,
	pub split_value: f32,
}

/// Examples go to the child at the index of their option.
#[derive(Clone, Debug)]
pub struct BranchSplitDiscrete {
	pub attribute_index: usize,
	pub n_options: usize,
}

impl BranchSplit {
	pub fn attribute_index(&self) -> usize {
		match self {
			BranchSplit::Continuous(split) => split.attribute_index,
			BranchSplit::Discrete(split) => split.attribute_index,
		}
	}

	/// The index of the child `example` goes to, or `None` if its value is missing.
	pub fn child_index(&self, example: ArrayView1<f32>) -> Option<usize> {
		match self {
			BranchSplit::Continuous(split) => {
				let value = example[split.attribute_index];
				if value.is_nan() {
					None
				} else if value <= split.split_value {
					Some(0)
				} else {
					Some(1)
				}
			}
			BranchSplit::Discrete(split) => {
				enum_index(example[split.attribute_index], split.n_options)
			}
		}
	}
}

impl Node {
	pub fn class_counts(&self) -> &[f64] {
		match self {
			Node::Branch(node) => &node.class_counts,
			Node::Leaf(node) => &node.class_counts,
		}
	}

	pub fn class_counts_mut(&mut self) -> &mut Vec<f64> {
		match self {
			Node::Branch(node) => &mut node.class_counts,
			Node::Leaf(node) => &mut node.class_counts,
		}
	}

	pub fn is_leaf(&self) -> bool {
		matches!(self, Node::Leaf(_))
	}

	/// Replace this subtree with a leaf holding its class counts.
	pub fn make_leaf(&mut self) {
		let class_counts = self.class_counts().to_owned();
		*self = Node::Leaf(LeafNode { class_counts });
	}

	/// The number of training errors a leaf with this node's class counts would make.
	pub fn leaf_errors(&self) -> f64 {
		let class_counts = self.class_counts();
		let total: f64 = class_counts.iter().sum();
		let max = class_counts.iter().cloned().fold(0.0, f64::max);
		total - max
	}

	/// The number of training errors made by the leaves of this subtree.
	pub fn subtree_errors(&self) -> f64 {
		match self {
			Node::Leaf(_) => self.leaf_errors(),
			Node::Branch(node) => node.children.iter().map(|child| child.subtree_errors()).sum(),
		}
	}

	pub fn n_leaves(&self) -> usize {
		match self {
			Node::Leaf(_) => 1,
			Node::Branch(node) => node.children.iter().map(|child| child.n_leaves()).sum(),
		}
	}

	/// Add the class probabilities for `example` from this subtree to `distribution`, scaled by `weight`.
	pub fn accumulate(
		&self,
		example: ArrayView1<f32>,
		weight: f64,
		parent_class_counts: &[f64],
		distribution: &mut [f64],
	) {
		match self {
			Node::Leaf(node) => {
				let total: f64 = node.class_counts.iter().sum();
				let (class_counts, total) = if total > 0.0 {
					(node.class_counts.as_slice(), total)
				} else {
					(parent_class_counts, parent_class_counts.iter().sum())
				};
				if total > 0.0 {
					for (probability, count) in distribution.iter_mut().zip(class_counts.iter()) {
						*probability += weight * count / total;
					}
				}
			}
			Node::Branch(node) => match node.split.child_index(example) {
				Some(child_index) if child_index < node.children.len() => {
					let child = &node.children[child_index];
					child.accumulate(example, weight, &node.class_counts, distribution)
				}
				_ => {
					for (child, branch_weight) in
						node.children.iter().zip(node.branch_weights.iter())
					{
						if *branch_weight > 0.0 {
							child.accumulate(
								example,
								weight * branch_weight,
								&node.class_counts,
								distribution,
							);
						}
					}
				}
			},
		}
	}
}

impl Tree {
	pub fn compute_distribution(&self, example: ArrayView1<f32>) -> Array1<f32> {
		let mut distribution = vec![0.0; self.n_classes];
		let root_class_counts = self.root.class_counts().to_owned();
		self.root
			.accumulate(example, 1.0, &root_class_counts, &mut distribution);
		let mut distribution: Array1<f32> = distribution.iter().map(|p| *p as f32).collect();
		normalize(&mut distribution);
		distribution
	}
}

impl Model for Tree {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		Ok(self.compute_distribution(example))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn tree() -> Tree {
		Tree {
			root: Node::Branch(BranchNode {
				split: BranchSplit::Continuous(BranchSplitContinuous {
					attribute_index: 0,
					split_value: 1.5,
				}),
				children: vec![
					Node::Leaf(LeafNode {
						class_counts: vec![3.0, 1.0],
					}),
					Node::Leaf(LeafNode {
						class_counts: vec![0.0, 0.0],
					}),
				],
				branch_weights: vec![0.5, 0.5],
				class_counts: vec![3.0, 5.0],
			}),
			n_attributes: 1,
			n_classes: 2,
		}
	}

	#[test]
	fn test_leaf_distribution() {
		let tree = tree();
		assert_eq!(tree.compute_distribution(arr1(&[1.0]).view()), arr1(&[0.75, 0.25]));
	}

	#[test]
	fn test_empty_leaf_uses_parent() {
		let tree = tree();
		assert_eq!(
			tree.compute_distribution(arr1(&[2.0]).view()),
			arr1(&[0.375, 0.625])
		);
	}

	#[test]
	fn test_missing_value_goes_down_every_branch() {
		let tree = tree();
		let distribution = tree.compute_distribution(arr1(&[std::f32::NAN]).view());
		assert!((distribution[0] - (0.5 * 0.75 + 0.5 * 0.375)).abs() < 1e-6);
	}

	#[test]
	fn test_errors() {
		let tree = tree();
		assert_eq!(tree.root.leaf_errors(), 3.0);
		assert_eq!(tree.root.subtree_errors(), 1.0);
		assert_eq!(tree.root.n_leaves(), 2);
		assert!(tree.distribution(arr1(&[1.0, 2.0]).view()).is_err());
	}
}
