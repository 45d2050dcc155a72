use rand::Rng;
use std::sync::Arc;
use suinz_model::{rng, Committee, Instances, Learner, Model, TrainError};
use suinz_tree::RandomTree;

/// A RandomCommittee averages the predictions of randomized base models trained on the full training data with different seeds.
#[derive(Clone, Debug)]
pub struct RandomCommittee {
	pub base: Arc<dyn Learner>,
	pub n_members: usize,
}

impl Default for RandomCommittee {
	fn default() -> Self {
		Self {
			base: Arc::new(RandomTree::default()),
			n_members: 10,
		}
	}
}

impl Learner for RandomCommittee {
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let mut rng = rng(seed);
		let members = (0..self.n_members.max(1))
			.map(|_| self.base.train(instances, rng.gen()))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Box::new(Committee {
			members,
			n_classes: instances.n_classes(),
		}))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_deterministic() {
		let instances = datasets::weather();
		let a = RandomCommittee::default().train(&instances, 1).unwrap();
		let b = RandomCommittee::default().train(&instances, 1).unwrap();
		for example in instances.features.genrows() {
			assert_eq!(a.distribution(example).unwrap(), b.distribution(example).unwrap());
		}
		let model = RandomCommittee::default().train(&datasets::blobs(), 7).unwrap();
		assert!(datasets::training_accuracy(model.as_ref(), &datasets::blobs()) > 0.95);
	}
}
