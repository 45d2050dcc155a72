use crate::RandomTree;
use rand::Rng;
use suinz_model::{rng, Committee, Instances, Learner, Model, TrainError};

/// A RandomForest averages the predictions of random trees, each trained on a bootstrap sample of the training data.
#[derive(Clone, Debug)]
pub struct RandomForest {
	pub n_trees: usize,
	/// The options for each tree.
	pub tree: RandomTree,
}

impl Default for RandomForest {
	fn default() -> Self {
		Self {
			n_trees: 100,
			tree: RandomTree::default(),
		}
	}
}

impl Learner for RandomForest {
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let mut rng = rng(seed);
		let members = (0..self.n_trees.max(1))
			.map(|_| {
				let sample = instances.resample_with_weights(&mut rng);
				let tree_seed: u64 = rng.gen();
				self.tree.train(&sample, tree_seed)
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Box::new(Committee {
			members,
			n_classes: instances.n_classes(),
		}))
	}
}

#[test]
fn test_more_trees_agree_on_training_data() {
	let instances = suinz_model::datasets::blobs();
	let forest = RandomForest {
		n_trees: 10,
		..Default::default()
	};
	let model = forest.train(&instances, 1).unwrap();
	let accuracy = suinz_model::datasets::training_accuracy(model.as_ref(), &instances);
	assert!(accuracy > 0.95);
}
