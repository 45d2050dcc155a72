use crate::softmax;
use ndarray::prelude::*;
use rand::Rng;
use std::sync::Arc;
use suinz_model::{rng, Instances, Learner, Model, PredictError, TrainError};
use suinz_tree::DecisionStump;

/**
AdaBoostM1 boosts a base learner. Each round trains on the instances reweighted toward the examples the previous rounds got wrong, and boosting stops early once a round's weighted error is zero or at least one half. Base learners that ignore weights are trained on a sample drawn in proportion to the weights instead.
*/
#[derive(Clone, Debug)]
pub struct AdaBoostM1 {
	pub base: Arc<dyn Learner>,
	pub n_rounds: usize,
}

impl Default for AdaBoostM1 {
	fn default() -> Self {
		Self {
			base: Arc::new(DecisionStump),
			n_rounds: 10,
		}
	}
}

#[derive(Debug)]
pub struct AdaBoostM1Model {
	/// Each member with the weight of its vote.
	pub members: Vec<(Box<dyn Model>, f64)>,
	pub n_classes: usize,
}

impl Learner for AdaBoostM1 {
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let mut rng = rng(seed);
		let mut weights: Vec<f64> = instances.weights.iter().map(|w| *w as f64).collect();
		let mut members: Vec<(Box<dyn Model>, f64)> = Vec::new();
		for _ in 0..self.n_rounds.max(1) {
			let weighted =
				instances.with_weights(weights.iter().map(|weight| *weight as f32).collect());
			let member_seed: u64 = rng.gen();
			let model = if self.base.handles_weights() {
				self.base.train(&weighted, member_seed)?
			} else {
				let sample = weighted.resample_with_weights(&mut rng);
				self.base.train(&sample, member_seed)?
			};
			// Compute the weighted training error of this round's model.
			let mut is_correct = Vec::with_capacity(instances.n_examples());
			for (example, label) in instances
				.features
				.genrows()
				.into_iter()
				.zip(instances.labels.iter())
			{
				let prediction = model
					.predict(example)
					.map_err(|error| TrainError::Member(error.to_string()))?;
				is_correct.push(prediction == *label);
			}
			let total: f64 = weights.iter().sum();
			let error: f64 = weights
				.iter()
				.zip(is_correct.iter())
				.filter(|(_, is_correct)| !**is_correct)
				.map(|(weight, _)| *weight)
				.sum::<f64>() / total;
			if !(error > 0.0 && error < 0.5) {
				// A perfect or useless first model is kept alone.
				if members.is_empty() {
					members.push((model, 1.0));
				}
				break;
			}
			let beta = error / (1.0 - error);
			members.push((model, (1.0 / beta).ln()));
			// Shrink the weights of the correctly classified examples and renormalize.
			for (weight, is_correct) in weights.iter_mut().zip(is_correct.iter()) {
				if *is_correct {
					*weight *= beta;
				}
			}
			let new_total: f64 = weights.iter().sum();
			weights.iter_mut().for_each(|weight| *weight *= total / new_total);
		}
		Ok(Box::new(AdaBoostM1Model {
			members,
			n_classes: instances.n_classes(),
		}))
	}
}

impl Model for AdaBoostM1Model {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		if let [(member, _)] = self.members.as_slice() {
			return member.distribution(example);
		}
		let mut votes = vec![0.0; self.n_classes];
		for (member, weight) in self.members.iter() {
			let class = member.predict(example)?;
			if let Some(vote) = votes.get_mut(class) {
				*vote += weight;
			}
		}
		let distribution = softmax(Array1::from(votes).view()).mapv(|probability| probability as f32);
		Ok(distribution)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_boosting_beats_a_single_stump() {
		let instances = datasets::blobs();
		let stump = DecisionStump.train(&instances, 1).unwrap();
		let stump_accuracy = datasets::training_accuracy(stump.as_ref(), &instances);
		let model = AdaBoostM1::default().train(&instances, 1).unwrap();
		let accuracy = datasets::training_accuracy(model.as_ref(), &instances);
		assert!(accuracy > stump_accuracy);
	}

	#[test]
	fn test_perfect_first_round_stops() {
		let mut instances = datasets::blobs();
		// two classes that the first attribute separates
		instances.labels = instances.labels.iter().map(|label| (*label > 0) as usize).collect();
		instances.classes.truncate(2);
		let model = AdaBoostM1::default().train(&instances, 1).unwrap();
		let distribution = model.distribution(instances.features.row(0)).unwrap();
		assert_eq!(distribution, arr1(&[1.0, 0.0]));
	}
}
