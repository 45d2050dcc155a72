use crate::{
	grow::{grow, ChooseSplit, GrowOptions},
	node::{Node, Tree},
	split::{branch_weights, class_counts, evaluate_attribute, partition, Candidate, SplitOptions},
};
use rand::seq::SliceRandom;
use suinz_model::{rng, Instances, Learner, Model, TrainError};

/**
A REPTree is a fast tree learner. It grows a tree by information gain on most of the training data, then prunes it with reduced error pruning on a held out fold. Finally the class counts of the held out examples are added back into the tree.
*/
#[derive(Clone, Debug)]
pub struct REPTree {
	pub min_instances_per_leaf: f64,
	/// One of this many folds is held out for pruning.
	pub num_folds: usize,
	pub max_depth: Option<usize>,
	pub prune: bool,
}

impl Default for REPTree {
	fn default() -> Self {
		Self {
			min_instances_per_leaf: 2.0,
			num_folds: 3,
			max_depth: None,
			prune: true,
		}
	}
}

impl Learner for REPTree {
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let mut order: Vec<usize> = (0..instances.n_examples()).collect();
		order.shuffle(&mut rng(seed));
		let num_folds = self.num_folds.max(2);
		let prune = self.prune && instances.n_examples() >= num_folds;
		let mut grow_items = Vec::new();
		let mut prune_items = Vec::new();
		for (position, index) in order.into_iter().enumerate() {
			let item = (index, instances.weights[index] as f64);
			if prune && position % num_folds == 0 {
				prune_items.push(item);
			} else {
				grow_items.push(item);
			}
		}
		let options = GrowOptions {
			min_leaf_weight: self.min_instances_per_leaf,
			max_depth: self.max_depth,
		};
		let mut chooser = InfoGainChooser {
			options: SplitOptions {
				min_leaf_weight: self.min_instances_per_leaf,
				c45: false,
			},
		};
		let mut root = grow(instances, &grow_items, &options, &mut chooser, 0);
		if prune {
			let root_class_counts = root.class_counts().to_owned();
			prune_and_backfit(&mut root, instances, &prune_items, &root_class_counts);
		}
		Ok(Box::new(Tree {
			root,
			n_attributes: instances.n_attributes(),
			n_classes: instances.n_classes(),
		}))
	}
}

struct InfoGainChooser {
	options: SplitOptions,
}

impl ChooseSplit for InfoGainChooser {
	fn choose_split(&mut self, instances: &Instances, items: &[(usize, f64)]) -> Option<Candidate> {
		let mut best: Option<Candidate> = None;
		for attribute_index in 0..instances.n_attributes() {
			let candidate = match evaluate_attribute(instances, items, attribute_index, self.options)
			{
				Some(candidate) => candidate,
				None => continue,
			};
			let is_better = best
				.as_ref()
				.map(|best| candidate.gain > best.gain)
				.unwrap_or(true);
			if is_better {
				best = Some(candidate);
			}
		}
		best.filter(|best| best.gain > 1e-10)
	}
}

/// The weight of the held out examples a leaf with `class_counts` would misclassify.
fn holdout_errors(class_counts: &[f64], holdout_counts: &[f64]) -> f64 {
	let mut prediction = 0;
	for (class_index, count) in class_counts.iter().enumerate() {
		if *count > class_counts[prediction] {
			prediction = class_index;
		}
	}
	let total: f64 = holdout_counts.iter().sum();
	total - holdout_counts.get(prediction).cloned().unwrap_or(0.0)
}

/**
Prune `node` bottom up against the held out `items`, replacing a subtree with a leaf if the leaf makes no more errors on them. Then add the held out class counts to every remaining node. Returns the held out errors of the pruned subtree before the counts were added.
*/
fn prune_and_backfit(
	node: &mut Node,
	instances: &Instances,
	items: &[(usize, f64)],
	parent_class_counts: &[f64],
) -> f64 {
	let holdout_counts = class_counts(instances, items);
	let own_class_counts = node.class_counts().to_owned();
	let predicting_counts: &[f64] = if own_class_counts.iter().sum::<f64>() > 0.0 {
		&own_class_counts
	} else {
		parent_class_counts
	};
	let leaf_errors = holdout_errors(predicting_counts, &holdout_counts);
	let errors = match node {
		Node::Leaf(_) => leaf_errors,
		Node::Branch(branch) => {
			let parts = partition(instances, items, &branch.split, &branch.branch_weights);
			let subtree_errors: f64 = branch
				.children
				.iter_mut()
				.zip(parts.iter())
				.map(|(child, part)| prune_and_backfit(child, instances, part, &own_class_counts))
				.sum();
			if leaf_errors <= subtree_errors {
				node.make_leaf();
				leaf_errors
			} else {
				subtree_errors
			}
		}
	};
	for (count, holdout_count) in node.class_counts_mut().iter_mut().zip(holdout_counts.iter()) {
		*count += holdout_count;
	}
	if let Node::Branch(branch) = node {
		let counts: Vec<Vec<f64>> = branch
			.children
			.iter()
			.map(|child| child.class_counts().to_owned())
			.collect();
		branch.branch_weights = branch_weights(&counts);
	}
	errors
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::node::{BranchNode, BranchSplit, BranchSplitContinuous, LeafNode};
	use suinz_model::datasets;

	#[test]
	fn test_prune_replaces_useless_split() {
		let instances = datasets::blobs();
		// A split on y that the held out examples do not support.
		let mut node = Node::Branch(BranchNode {
			split: BranchSplit::Continuous(BranchSplitContinuous {
				attribute_index: 1,
				split_value: 0.0,
			}),
			children: vec![
				Node::Leaf(LeafNode {
					class_counts: vec![0.0, 1.0, 0.0],
				}),
				Node::Leaf(LeafNode {
					class_counts: vec![3.0, 0.0, 0.0],
				}),
			],
			branch_weights: vec![0.25, 0.75],
			class_counts: vec![3.0, 1.0, 0.0],
		});
		let items: Vec<(usize, f64)> = (0..instances.n_examples())
			.filter(|index| instances.labels[*index] == 0)
			.map(|index| (index, 1.0))
			.collect();
		let errors = prune_and_backfit(&mut node, &instances, &items, &[1.0, 1.0, 1.0]);
		assert_eq!(errors, 0.0);
		assert!(node.is_leaf());
		assert_eq!(node.class_counts(), &[23.0, 1.0, 0.0]);
	}

	#[test]
	fn test_backfit_keeps_useful_split() {
		let instances = datasets::blobs();
		let mut node = Node::Branch(BranchNode {
			split: BranchSplit::Continuous(BranchSplitContinuous {
				attribute_index: 0,
				split_value: 1.5,
			}),
			children: vec![
				Node::Leaf(LeafNode {
					class_counts: vec![5.0, 0.0, 0.0],
				}),
				Node::Leaf(LeafNode {
					class_counts: vec![0.0, 5.0, 0.0],
				}),
			],
			branch_weights: vec![0.5, 0.5],
			class_counts: vec![5.0, 5.0, 0.0],
		});
		let items: Vec<(usize, f64)> = (0..6).map(|index| (index, 1.0)).collect();
		prune_and_backfit(&mut node, &instances, &items, &[1.0, 1.0, 1.0]);
		assert!(!node.is_leaf());
		assert_eq!(node.class_counts(), &[7.0, 7.0, 2.0]);
	}
}
