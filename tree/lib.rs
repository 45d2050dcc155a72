/*!
This crate implements decision tree classifiers: [`J48`](struct.J48.html), a C4.5 tree with pessimistic pruning, [`RandomTree`](struct.RandomTree.html), an unpruned tree over random attribute subsets, [`REPTree`](struct.REPTree.html), a tree with reduced error pruning, [`DecisionStump`](struct.DecisionStump.html), a single split, and [`RandomForest`](struct.RandomForest.html), a bagged ensemble of random trees.

All the trees share the [`Node`](enum.Node.html) representation. Examples whose value for a split's attribute is missing are sent down every branch, weighted by the fraction of the training examples that went down each branch.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod grow;
mod j48;
mod node;
mod random_forest;
mod random_tree;
mod rep_tree;
mod split;
mod stump;

pub use self::j48::J48;
pub use self::node::{
	BranchNode, BranchSplit, BranchSplitContinuous, BranchSplitDiscrete, LeafNode, Node, Tree,
};
pub use self::random_forest::RandomForest;
pub use self::random_tree::RandomTree;
pub use self::rep_tree::REPTree;
pub use self::stump::DecisionStump;

#[cfg(test)]
mod test {
	use super::*;
	use ndarray::prelude::*;
	use suinz_model::{datasets, Learner};

	pub fn check_learner(learner: &dyn Learner, min_accuracy: f32) {
		let instances = datasets::blobs();
		let model = learner.train(&instances, 1).unwrap();
		let accuracy = datasets::training_accuracy(model.as_ref(), &instances);
		assert!(
			accuracy >= min_accuracy,
			"{:?} has training accuracy {}",
			learner,
			accuracy
		);
		let weather = datasets::weather();
		let model = learner.train(&weather, 1).unwrap();
		for example in weather.features.genrows() {
			let distribution = model.distribution(example).unwrap();
			assert_eq!(distribution.len(), 2);
			assert!((distribution.sum() - 1.0).abs() < 1e-4);
		}
		let missing = Array1::from_elem(4, std::f32::NAN);
		let distribution = model.distribution(missing.view()).unwrap();
		assert!((distribution.sum() - 1.0).abs() < 1e-4);
	}

	#[test]
	fn test_learners() {
		check_learner(&J48::default(), 0.95);
		check_learner(&RandomTree::default(), 0.95);
		check_learner(&REPTree::default(), 0.9);
		check_learner(&DecisionStump::default(), 0.6);
		check_learner(&RandomForest::default(), 0.95);
	}

	#[test]
	fn test_randomized_learners_are_deterministic() {
		let instances = datasets::weather();
		for learner in [
			&RandomTree::default() as &dyn Learner,
			&REPTree::default(),
			&RandomForest::default(),
		]
		.iter()
		{
			let a = learner.train(&instances, 3).unwrap();
			let b = learner.train(&instances, 3).unwrap();
			for example in instances.features.genrows() {
				assert_eq!(
					a.distribution(example).unwrap(),
					b.distribution(example).unwrap()
				);
			}
		}
	}

	#[test]
	fn test_consecutive_float_values() {
		let instances = datasets::adjacent_values();
		for learner in [
			&J48::default() as &dyn Learner,
			&RandomTree::default(),
			&REPTree::default(),
			&DecisionStump::default(),
			&RandomForest::default(),
		]
		.iter()
		{
			let model = learner.train(&instances, 1).unwrap();
			let accuracy = datasets::training_accuracy(model.as_ref(), &instances);
			assert!(accuracy >= 0.5, "{:?} has training accuracy {}", learner, accuracy);
		}
		let model = J48 {
			prune: false,
			..Default::default()
		}
		.train(&instances, 1)
		.unwrap();
		assert_eq!(datasets::training_accuracy(model.as_ref(), &instances), 1.0);
	}
}
