use crate::{
	grow::{grow, ChooseSplit, GrowOptions},
	node::{Node, Tree},
	split::{evaluate_attribute, Candidate, SplitOptions},
};
use suinz_model::{math::additional_errors, Instances, Learner, Model, TrainError};

/// J48 is a C4.5 decision tree. Splits are chosen by gain ratio among the attributes with at least average information gain, and the grown tree is pruned by replacing subtrees whose pessimistic error estimate is no better than a leaf's.
#[derive(Clone, Debug)]
pub struct J48 {
	/// The confidence used to compute the pessimistic error estimates. Smaller values prune more.
	pub confidence_factor: f64,
	/// A split is only made if at least two branches receive this much weight.
	pub min_instances_per_leaf: f64,
	/// If false, the tree is left as grown.
	pub prune: bool,
}

impl Default for J48 {
	fn default() -> Self {
		Self {
			confidence_factor: 0.25,
			min_instances_per_leaf: 2.0,
			prune: true,
		}
	}
}

impl J48 {
	/// Grow and prune a tree on `items`.
	pub fn grow_tree(&self, instances: &Instances, items: &[(usize, f64)]) -> Node {
		let options = GrowOptions {
			min_leaf_weight: self.min_instances_per_leaf,
			max_depth: None,
		};
		let mut chooser = GainRatioChooser {
			options: SplitOptions {
				min_leaf_weight: self.min_instances_per_leaf,
				c45: true,
			},
		};
		let mut root = grow(instances, items, &options, &mut chooser, 0);
		if self.prune {
			collapse(&mut root);
			prune(&mut root, self.confidence_factor);
		}
		root
	}
}

impl Learner for J48 {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let items: Vec<(usize, f64)> = instances
			.weights
			.iter()
			.enumerate()
			.map(|(index, weight)| (index, *weight as f64))
			.collect();
		let root = self.grow_tree(instances, &items);
		Ok(Box::new(Tree {
			root,
			n_attributes: instances.n_attributes(),
			n_classes: instances.n_classes(),
		}))
	}
}

struct GainRatioChooser {
	options: SplitOptions,
}

impl ChooseSplit for GainRatioChooser {
	fn choose_split(&mut self, instances: &Instances, items: &[(usize, f64)]) -> Option<Candidate> {
		let candidates: Vec<Candidate> = (0..instances.n_attributes())
			.filter_map(|attribute_index| {
				evaluate_attribute(instances, items, attribute_index, self.options)
			})
			.collect();
		if candidates.is_empty() {
			return None;
		}
		let average_gain =
			candidates.iter().map(|candidate| candidate.gain).sum::<f64>() / candidates.len() as f64;
		let mut best: Option<Candidate> = None;
		for candidate in candidates {
			if candidate.gain <= 0.0 || candidate.gain < average_gain - 1e-3 {
				continue;
			}
			let is_better = best
				.as_ref()
				.map(|best| candidate.gain_ratio > best.gain_ratio)
				.unwrap_or(true);
			if is_better {
				best = Some(candidate);
			}
		}
		best.filter(|best| best.gain_ratio > 0.0)
	}
}

/// Replace subtrees that make no fewer training errors than a leaf would.
fn collapse(node: &mut Node) {
	if let Node::Branch(branch) = node {
		let subtree_errors: f64 = branch.children.iter().map(|child| child.subtree_errors()).sum();
		let leaf_errors = node.leaf_errors();
		if subtree_errors >= leaf_errors - 1e-3 {
			node.make_leaf();
		} else if let Node::Branch(branch) = node {
			for child in branch.children.iter_mut() {
				collapse(child);
			}
		}
	}
}

/// The pessimistic estimate of the errors of a leaf with `class_counts`.
fn estimated_leaf_errors(class_counts: &[f64], confidence_factor: f64) -> f64 {
	let total: f64 = class_counts.iter().sum();
	let max = class_counts.iter().cloned().fold(0.0, f64::max);
	let errors = total - max;
	errors + additional_errors(total, errors, confidence_factor)
}

fn estimated_subtree_errors(node: &Node, confidence_factor: f64) -> f64 {
	match node {
		Node::Leaf(leaf) => estimated_leaf_errors(&leaf.class_counts, confidence_factor),
		Node::Branch(branch) => branch
			.children
			.iter()
			.map(|child| estimated_subtree_errors(child, confidence_factor))
			.sum(),
	}
}

/// Prune bottom up, replacing a subtree with a leaf when the leaf's estimated errors are not much worse.
fn prune(node: &mut Node, confidence_factor: f64) {
	if let Node::Branch(branch) = node {
		for child in branch.children.iter_mut() {
			prune(child, confidence_factor);
		}
		let leaf_errors = estimated_leaf_errors(&branch.class_counts, confidence_factor);
		let tree_errors = estimated_subtree_errors(node, confidence_factor);
		if leaf_errors <= tree_errors + 0.1 {
			node.make_leaf();
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_blobs_tree_is_small() {
		let instances = datasets::blobs();
		let items: Vec<(usize, f64)> = (0..instances.n_examples()).map(|i| (i, 1.0)).collect();
		let root = J48::default().grow_tree(&instances, &items);
		// x alone separates the three classes
		assert_eq!(root.n_leaves(), 3);
		assert_eq!(root.subtree_errors(), 0.0);
	}

	#[test]
	fn test_weather_root_is_outlook() {
		let instances = datasets::weather();
		let items: Vec<(usize, f64)> = (0..instances.n_examples()).map(|i| (i, 1.0)).collect();
		let root = J48 {
			prune: false,
			..Default::default()
		}
		.grow_tree(&instances, &items);
		match root {
			Node::Branch(branch) => assert_eq!(branch.split.attribute_index(), 0),
			Node::Leaf(_) => panic!("expected a split"),
		}
	}

	#[test]
	fn test_pruning_removes_noise() {
		// The class does not depend on the attribute, so the pruned tree is a single leaf.
		let mut instances = datasets::blobs();
		instances.labels = (0..instances.n_examples()).map(|i| (i / 2) % 3).collect();
		let instances = instances.select_attributes(&[2]);
		let items: Vec<(usize, f64)> = (0..instances.n_examples()).map(|i| (i, 1.0)).collect();
		let root = J48::default().grow_tree(&instances, &items);
		assert!(root.is_leaf());
	}
}
