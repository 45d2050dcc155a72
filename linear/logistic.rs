use crate::{
	early_stopping::{EarlyStoppingMonitor, EarlyStoppingOptions},
	FeatureEncoder, Scaling,
};
use itertools::izip;
use ndarray::prelude::*;
use ndarray::Zip;
use suinz_model::{check_example, Instances, Learner, Model, PredictError, TrainError};

/// These are the options for multinomial logistic regression. The features are standardized and every epoch takes one gradient step on the full training set.
#[derive(Clone, Debug)]
pub struct Logistic {
	/// This is the L2 regularization value to use when updating the model parameters.
	pub ridge: f32,
	/// This is the learning rate to use when updating the model parameters.
	pub learning_rate: f32,
	/// This is the maximum number of epochs to train.
	pub max_epochs: usize,
	/// If `Some`, training stops once the training loss stops improving.
	pub early_stopping_options: Option<EarlyStoppingOptions>,
}

impl Default for Logistic {
	fn default() -> Self {
		Self {
			ridge: 1e-8,
			learning_rate: 0.5,
			max_epochs: 1000,
			early_stopping_options: Some(EarlyStoppingOptions {
				n_epochs_without_improvement_to_stop: 5,
				min_decrease_in_loss_for_significant_change: 1e-6,
			}),
		}
	}
}

#[derive(Clone, Debug)]
pub struct LogisticModel {
	pub encoder: FeatureEncoder,
	/// (n_features, n_classes)
	pub weights: Array2<f32>,
	/// (n_classes)
	pub biases: Array1<f32>,
	/// the loss value for each epoch
	pub losses: Vec<f32>,
	n_attributes: usize,
}

impl Learner for Logistic {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let encoder = FeatureEncoder::fit(instances, Scaling::Standardize);
		let features = encoder.encode(instances);
		let n_classes = instances.n_classes();
		let total_weight = instances.total_weight() as f32;
		let weights = Array1::from(instances.weights.clone());
		let labels = Array1::from(instances.labels.clone());
		let mut model = LogisticModel {
			weights: Array2::zeros((encoder.n_features(), n_classes)),
			biases: Array1::zeros(n_classes),
			losses: Vec::new(),
			encoder,
			n_attributes: instances.n_attributes(),
		};
		if total_weight <= 0.0 {
			return Ok(Box::new(model));
		}
		let mut early_stopping_monitor = self
			.early_stopping_options
			.as_ref()
			.map(EarlyStoppingMonitor::new);
		for epoch in 0..self.max_epochs {
			model.train_epoch(features.view(), labels.view(), weights.view(), total_weight, self);
			let loss = model.compute_loss(features.view(), labels.view(), weights.view(), total_weight, self.ridge);
			if !loss.is_finite() {
				return Err(TrainError::NotConverged(format!(
					"the loss was {} after epoch {}",
					loss,
					epoch + 1
				)));
			}
			model.losses.push(loss);
			if let Some(early_stopping_monitor) = early_stopping_monitor.as_mut() {
				if early_stopping_monitor.update(loss) {
					break;
				}
			}
		}
		Ok(Box::new(model))
	}
}

impl LogisticModel {
	fn train_epoch(
		&mut self,
		features: ArrayView2<f32>,
		labels: ArrayView1<usize>,
		weights: ArrayView1<f32>,
		total_weight: f32,
		options: &Logistic,
	) {
		let learning_rate = options.learning_rate;
		let mut predictions = features.dot(&self.weights) + &self.biases;
		softmax(predictions.view_mut());
		Zip::indexed(predictions.view_mut())
			.and_broadcast(labels.insert_axis(Axis(1)))
			.apply(|(_, class_index), prediction, label| {
				*prediction -= if class_index == *label { 1.0 } else { 0.0 }
			});
		let mut py = predictions;
		for (mut row, weight) in py.genrows_mut().into_iter().zip(weights.iter()) {
			row *= *weight / total_weight;
		}
		let weight_gradients = features.t().dot(&py) + &(&self.weights * options.ridge);
		let bias_gradients = py.sum_axis(Axis(0));
		Zip::from(&mut self.weights)
			.and(&weight_gradients)
			.apply(|weight, weight_gradient| *weight += -learning_rate * weight_gradient);
		Zip::from(&mut self.biases)
			.and(&bias_gradients)
			.apply(|bias, bias_gradient| *bias += -learning_rate * bias_gradient);
	}

	/// The weighted mean cross entropy plus the ridge penalty.
	fn compute_loss(
		&self,
		features: ArrayView2<f32>,
		labels: ArrayView1<usize>,
		weights: ArrayView1<f32>,
		total_weight: f32,
		ridge: f32,
	) -> f32 {
		let mut probabilities = features.dot(&self.weights) + &self.biases;
		softmax(probabilities.view_mut());
		let mut loss = 0.0;
		for (probabilities, label, weight) in izip!(probabilities.genrows(), labels, weights) {
			loss -= weight * probabilities[*label].max(std::f32::EPSILON).ln();
		}
		loss / total_weight + 0.5 * ridge * self.weights.mapv(|weight| weight * weight).sum()
	}
}

impl Model for LogisticModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		let features = self.encoder.encode_example(example);
		let logits = features.dot(&self.weights) + &self.biases;
		let mut logits = logits.insert_axis(Axis(0));
		softmax(logits.view_mut());
		let mut distribution = logits.index_axis_move(Axis(0), 0);
		suinz_model::normalize(&mut distribution);
		Ok(distribution)
	}
}

fn softmax(mut logits: ArrayViewMut2<f32>) {
	for mut logits in logits.genrows_mut() {
		let max = logits.iter().fold(std::f32::MIN, |a, &b| a.max(b));
		logits -= max;
		logits.mapv_inplace(|l| l.exp());
		let sum = logits.iter().fold(0.0, |a, b| a + b);
		logits /= sum;
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_blobs() {
		let instances = datasets::blobs();
		let model = Logistic::default().train(&instances, 1).unwrap();
		let accuracy = datasets::training_accuracy(model.as_ref(), &instances);
		assert!(accuracy > 0.95);
	}

	#[test]
	fn test_loss_decreases() {
		let instances = datasets::weather();
		let encoder = FeatureEncoder::fit(&instances, Scaling::Standardize);
		let features = encoder.encode(&instances);
		let labels = Array1::from(instances.labels.clone());
		let weights = Array1::from(instances.weights.clone());
		let options = Logistic::default();
		let mut model = LogisticModel {
			weights: Array2::zeros((encoder.n_features(), 2)),
			biases: Array1::zeros(2),
			losses: Vec::new(),
			encoder,
			n_attributes: 4,
		};
		let before = model.compute_loss(features.view(), labels.view(), weights.view(), 14.0, options.ridge);
		assert!((before - 2.0f32.ln()).abs() < 1e-5);
		for _ in 0..10 {
			model.train_epoch(features.view(), labels.view(), weights.view(), 14.0, &options);
		}
		let after = model.compute_loss(features.view(), labels.view(), weights.view(), 14.0, options.ridge);
		assert!(after < before);
	}

	#[test]
	fn test_divergence_is_an_error() {
		let instances = datasets::blobs();
		let logistic = Logistic {
			learning_rate: std::f32::INFINITY,
			..Default::default()
		};
		assert!(matches!(
			logistic.train(&instances, 1),
			Err(TrainError::NotConverged(_))
		));
	}
}
