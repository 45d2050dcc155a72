use ndarray::prelude::*;
use rand::{seq::SliceRandom, Rng};
use std::sync::Arc;
use suinz_model::{check_example, rng, Committee, Instances, Learner, Model, PredictError, TrainError};
use suinz_tree::REPTree;

/// RandomSubSpace averages the predictions of base models that each see a random subset of the attributes.
#[derive(Clone, Debug)]
pub struct RandomSubSpace {
	pub base: Arc<dyn Learner>,
	pub n_members: usize,
	/// The fraction of the attributes each member sees.
	pub subspace_size: f64,
}

impl Default for RandomSubSpace {
	fn default() -> Self {
		Self {
			base: Arc::new(REPTree::default()),
			n_members: 10,
			subspace_size: 0.5,
		}
	}
}

/// A model trained on the attributes at `attribute_indexes`.
#[derive(Debug)]
pub struct SubspaceModel {
	pub attribute_indexes: Vec<usize>,
	pub model: Box<dyn Model>,
	n_attributes: usize,
}

impl RandomSubSpace {
	fn n_selected(&self, n_attributes: usize) -> usize {
		let n_selected = (self.subspace_size * n_attributes as f64).round() as usize;
		n_selected.max(1).min(n_attributes)
	}
}

impl Learner for RandomSubSpace {
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let mut rng = rng(seed);
		let n_attributes = instances.n_attributes();
		let n_selected = self.n_selected(n_attributes);
		let mut members: Vec<Box<dyn Model>> = Vec::with_capacity(self.n_members);
		for _ in 0..self.n_members.max(1) {
			let mut attribute_indexes: Vec<usize> = (0..n_attributes).collect();
			attribute_indexes.shuffle(&mut rng);
			attribute_indexes.truncate(n_selected);
			attribute_indexes.sort_unstable();
			let subspace = instances.select_attributes(&attribute_indexes);
			let model = self.base.train(&subspace, rng.gen())?;
			members.push(Box::new(SubspaceModel {
				attribute_indexes,
				model,
				n_attributes,
			}));
		}
		Ok(Box::new(Committee {
			members,
			n_classes: instances.n_classes(),
		}))
	}
}

impl Model for SubspaceModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		let example = example.select(Axis(0), &self.attribute_indexes);
		self.model.distribution(example.view())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_n_selected() {
		let random_subspace = RandomSubSpace::default();
		assert_eq!(random_subspace.n_selected(1), 1);
		assert_eq!(random_subspace.n_selected(3), 2);
		assert_eq!(random_subspace.n_selected(4), 2);
	}

	#[test]
	fn test_members_see_the_full_example() {
		let instances = datasets::blobs();
		let model = RandomSubSpace::default().train(&instances, 1).unwrap();
		let distribution = model.distribution(instances.features.row(0)).unwrap();
		assert!((distribution.sum() - 1.0).abs() < 1e-5);
		assert!(model.distribution(arr1(&[0.0, 1.0]).view()).is_err());
	}
}
