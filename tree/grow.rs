use crate::{
	node::{BranchNode, LeafNode, Node},
	split::{branch_weights, class_counts, is_pure, partition, Candidate},
};
use suinz_model::Instances;

/// The strategy each tree uses to pick the split at a node.
pub trait ChooseSplit {
	fn choose_split(&mut self, instances: &Instances, items: &[(usize, f64)]) -> Option<Candidate>;
}

#[derive(Clone, Copy, Debug)]
pub struct GrowOptions {
	/// A node is only split if it has at least twice this much weight.
	pub min_leaf_weight: f64,
	/// The depth of the tree will never exceed this value.
	pub max_depth: Option<usize>,
}

/// Grow a tree on `items` recursively, splitting each node with `chooser` until a stopping condition holds.
pub fn grow(
	instances: &Instances,
	items: &[(usize, f64)],
	options: &GrowOptions,
	chooser: &mut impl ChooseSplit,
	depth: usize,
) -> Node {
	let class_counts = class_counts(instances, items);
	let total_weight: f64 = class_counts.iter().sum();
	let at_max_depth = options
		.max_depth
		.map(|max_depth| depth >= max_depth)
		.unwrap_or(false);
	if total_weight < 2.0 * options.min_leaf_weight || is_pure(&class_counts) || at_max_depth {
		return Node::Leaf(LeafNode { class_counts });
	}
	let candidate = match chooser.choose_split(instances, items) {
		Some(candidate) => candidate,
		None => return Node::Leaf(LeafNode { class_counts }),
	};
	let branch_weights = branch_weights(&candidate.counts);
	let parts = partition(instances, items, &candidate.split, &branch_weights);
	// A split that sends all the weight down one branch would recurse on the same items forever.
	let is_degenerate = parts.iter().any(|part| {
		let part_weight: f64 = part.iter().map(|(_, weight)| weight).sum();
		part_weight >= total_weight - 1e-9
	});
	if is_degenerate {
		return Node::Leaf(LeafNode { class_counts });
	}
	let children = parts
		.iter()
		.map(|part| grow(instances, part, options, chooser, depth + 1))
		.collect();
	Node::Branch(BranchNode {
		split: candidate.split,
		children,
		branch_weights,
		class_counts,
	})
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::node::{BranchSplit, BranchSplitContinuous};
	use suinz_model::datasets;

	/// Always splits on `x` above every value, so all the weight goes to the first child.
	struct OneSided;

	impl ChooseSplit for OneSided {
		fn choose_split(&mut self, instances: &Instances, items: &[(usize, f64)]) -> Option<Candidate> {
			let counts = vec![class_counts(instances, items), vec![0.0; instances.n_classes()]];
			Some(Candidate {
				split: BranchSplit::Continuous(BranchSplitContinuous {
					attribute_index: 0,
					split_value: f32::MAX,
				}),
				counts,
				missing_weight: 0.0,
				gain: 1.0,
				gain_ratio: 1.0,
			})
		}
	}

	#[test]
	fn test_one_sided_split_is_a_leaf() {
		let instances = datasets::blobs();
		let items: Vec<(usize, f64)> = (0..instances.n_examples()).map(|i| (i, 1.0)).collect();
		let options = GrowOptions {
			min_leaf_weight: 1.0,
			max_depth: None,
		};
		let root = grow(&instances, &items, &options, &mut OneSided, 0);
		assert!(root.is_leaf());
		assert_eq!(root.n_leaves(), 1);
	}
}
