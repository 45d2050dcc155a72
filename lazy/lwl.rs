use crate::EuclideanDistance;
use ndarray::prelude::*;
use std::sync::Arc;
use suinz_model::{check_example, Instances, Learner, Model, PredictError, TrainError};
use suinz_tree::DecisionStump;

/**
LWL is locally weighted learning. To classify an example it weights every training instance by a linear kernel of its distance to the example, with the bandwidth set to the distance of the furthest instance, and trains the base learner on the weighted instances.
*/
#[derive(Clone, Debug)]
pub struct LWL {
	pub base: Arc<dyn Learner>,
}

impl Default for LWL {
	fn default() -> Self {
		Self {
			base: Arc::new(DecisionStump),
		}
	}
}

#[derive(Debug)]
pub struct LWLModel {
	base: Arc<dyn Learner>,
	distance: EuclideanDistance,
	instances: Instances,
}

impl Learner for LWL {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		Ok(Box::new(LWLModel {
			base: self.base.clone(),
			distance: EuclideanDistance::fit(instances),
			instances: instances.clone(),
		}))
	}
}

/// The kernel weight of each training instance, scaled so the weights sum to the original total weight.
fn kernel_weights(distances: &[f32], weights: &[f32]) -> Vec<f32> {
	let bandwidth = distances.iter().cloned().fold(0.0, f32::max);
	let mut kernel: Vec<f32> = distances
		.iter()
		.zip(weights.iter())
		.map(|(distance, weight)| {
			let scaled = if bandwidth > 0.0 {
				distance / bandwidth
			} else {
				0.0
			};
			// The furthest instance keeps a tiny weight.
			(1.0001 - scaled).max(0.0) * weight
		})
		.collect();
	let total: f32 = weights.iter().sum();
	let new_total: f32 = kernel.iter().sum();
	if new_total > 0.0 {
		kernel.iter_mut().for_each(|weight| *weight *= total / new_total);
	}
	kernel
}

impl Model for LWLModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.instances.n_attributes(), example)?;
		let distances = self.distance.distances(&self.instances, example);
		let weights = kernel_weights(&distances, &self.instances.weights);
		let local = self.instances.with_weights(weights);
		let model = self.base.train(&local, 1)?;
		model.distribution(example)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_kernel_weights() {
		let weights = kernel_weights(&[0.0, 1.0, 2.0], &[1.0, 1.0, 1.0]);
		assert!(weights[0] > weights[1] && weights[1] > weights[2]);
		assert!((weights.iter().sum::<f32>() - 3.0).abs() < 1e-5);
		assert!(weights[2] > 0.0);
	}

	#[test]
	fn test_local_stump_beats_global_stump() {
		let instances = datasets::blobs();
		let model = LWL::default().train(&instances, 1).unwrap();
		let accuracy = datasets::training_accuracy(model.as_ref(), &instances);
		assert!(accuracy > 0.9);
	}
}
