use rand::Rng;
use std::sync::Arc;
use suinz_model::{rng, Committee, Instances, Learner, Model, TrainError};
use suinz_tree::REPTree;

/// Bagging averages the predictions of base models trained on bootstrap samples of the training data.
#[derive(Clone, Debug)]
pub struct Bagging {
	pub base: Arc<dyn Learner>,
	pub n_bags: usize,
}

impl Default for Bagging {
	fn default() -> Self {
		Self {
			base: Arc::new(REPTree::default()),
			n_bags: 10,
		}
	}
}

impl Learner for Bagging {
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let mut rng = rng(seed);
		let members = (0..self.n_bags.max(1))
			.map(|_| {
				let bag = instances.resample_with_weights(&mut rng);
				let member_seed: u64 = rng.gen();
				self.base.train(&bag, member_seed)
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Box::new(Committee {
			members,
			n_classes: instances.n_classes(),
		}))
	}
}

#[test]
fn test_bagging() {
	let instances = suinz_model::datasets::blobs();
	let model = Bagging::default().train(&instances, 1).unwrap();
	let accuracy = suinz_model::datasets::training_accuracy(model.as_ref(), &instances);
	assert!(accuracy > 0.9);
}
