use crate::{softmax, RegressionStump};
use itertools::izip;
use ndarray::prelude::*;
use suinz_model::{check_example, Instances, Learner, Model, PredictError, TrainError};

/**
LogitBoost fits an additive multiclass logistic regression model. Each round fits one weighted regression stump per class to the working responses of the current model and adds the centered stump outputs to the class scores.
*/
#[derive(Clone, Debug)]
pub struct LogitBoost {
	pub n_rounds: usize,
	/// Each round's contribution is multiplied by this value.
	pub shrinkage: f64,
}

impl Default for LogitBoost {
	fn default() -> Self {
		Self {
			n_rounds: 10,
			shrinkage: 1.0,
		}
	}
}

#[derive(Clone, Debug)]
pub struct LogitBoostModel {
	/// (n_rounds, n_classes)
	pub rounds: Vec<Vec<RegressionStump>>,
	pub shrinkage: f64,
	n_attributes: usize,
	n_classes: usize,
}

/// The largest working response. Larger values make the fit unstable for examples the model is already sure of.
const MAX_RESPONSE: f64 = 3.0;

impl Learner for LogitBoost {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let n_classes = instances.n_classes();
		let n_examples = instances.n_examples();
		let mut model = LogitBoostModel {
			rounds: Vec::new(),
			shrinkage: self.shrinkage,
			n_attributes: instances.n_attributes(),
			n_classes,
		};
		if n_classes < 2 {
			return Ok(Box::new(model));
		}
		// (n_examples, n_classes)
		let mut scores = Array2::<f64>::zeros((n_examples, n_classes));
		let mut probabilities = Array2::<f64>::from_elem((n_examples, n_classes), 1.0 / n_classes as f64);
		let mut responses = vec![0.0; n_examples];
		let mut response_weights = vec![0.0; n_examples];
		for _ in 0..self.n_rounds {
			// Fit a stump to the working responses of each class.
			let mut stumps = Vec::with_capacity(n_classes);
			for class_index in 0..n_classes {
				for (response, response_weight, probability, label, weight) in izip!(
					responses.iter_mut(),
					response_weights.iter_mut(),
					probabilities.column(class_index),
					instances.labels.iter(),
					instances.weights.iter(),
				) {
					let (r, w) = working_response(*label == class_index, *probability);
					*response = r;
					*response_weight = w * *weight as f64;
				}
				stumps.push(RegressionStump::fit(instances, &responses, &response_weights));
			}
			// Update the scores and probabilities of every training example.
			for (example, mut scores, mut probabilities) in izip!(
				instances.features.genrows(),
				scores.genrows_mut(),
				probabilities.genrows_mut(),
			) {
				scores += &centered_outputs(&stumps, example, self.shrinkage);
				probabilities.assign(&softmax(scores.view()));
			}
			model.rounds.push(stumps);
		}
		Ok(Box::new(model))
	}
}

/// The working response and weight of an example for one class, given the probability the model assigns to the class.
fn working_response(is_class: bool, probability: f64) -> (f64, f64) {
	if is_class {
		let response = if probability > 0.0 {
			(1.0 / probability).min(MAX_RESPONSE)
		} else {
			MAX_RESPONSE
		};
		(response, (1.0 - probability) / response)
	} else {
		let response = if probability < 1.0 {
			(-1.0 / (1.0 - probability)).max(-MAX_RESPONSE)
		} else {
			-MAX_RESPONSE
		};
		(response, -probability / response)
	}
}

/// The stump outputs centered across the classes and scaled by (J - 1) / J.
fn centered_outputs(stumps: &[RegressionStump], example: ArrayView1<f32>, shrinkage: f64) -> Array1<f64> {
	let n_classes = stumps.len() as f64;
	let outputs: Array1<f64> = stumps.iter().map(|stump| stump.predict(example)).collect();
	let mean = outputs.sum() / n_classes;
	outputs.mapv(|output| shrinkage * (n_classes - 1.0) / n_classes * (output - mean))
}

impl Model for LogitBoostModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		let mut scores = Array1::<f64>::zeros(self.n_classes);
		for stumps in self.rounds.iter() {
			scores += &centered_outputs(stumps, example, self.shrinkage);
		}
		let mut distribution = softmax(scores.view()).mapv(|probability| probability as f32);
		suinz_model::normalize(&mut distribution);
		Ok(distribution)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_working_response() {
		assert_eq!(working_response(true, 0.5), (2.0, 0.25));
		assert_eq!(working_response(false, 0.5), (-2.0, 0.25));
		// responses are capped for confident mistakes
		assert_eq!(working_response(true, 0.1).0, MAX_RESPONSE);
	}

	#[test]
	fn test_blobs() {
		let instances = datasets::blobs();
		let model = LogitBoost::default().train(&instances, 1).unwrap();
		assert_eq!(datasets::training_accuracy(model.as_ref(), &instances), 1.0);
	}

	#[test]
	fn test_no_rounds_is_uniform() {
		let instances = datasets::weather();
		let model = LogitBoost {
			n_rounds: 0,
			..Default::default()
		}
		.train(&instances, 1)
		.unwrap();
		let distribution = model.distribution(instances.features.row(0)).unwrap();
		assert_eq!(distribution, arr1(&[0.5, 0.5]));
	}
}
