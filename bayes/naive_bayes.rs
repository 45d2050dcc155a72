use crate::softmax;
use ndarray::prelude::*;
use std::cmp::Ordering;
use suinz_model::{
	check_example, enum_index, Attribute, Instances, Learner, Model, PredictError, TrainError,
};

/// NaiveBayes estimates the probability of each attribute value given the class independently. Enum attributes use Laplace smoothed counts and number attributes use a weighted normal distribution per class.
#[derive(Clone, Debug, Default)]
pub struct NaiveBayes;

#[derive(Clone, Debug)]
pub struct NaiveBayesModel {
	/// The log prior probability of each class.
	pub class_log_priors: Vec<f64>,
	pub estimators: Vec<Estimator>,
}

#[derive(Clone, Debug)]
pub enum Estimator {
	/// (n_classes, n_options) probabilities of each option given the class.
	Discrete(Array2<f64>),
	/// The mean and standard deviation of the attribute for each class. `None` for a class with no known values.
	Normal(Vec<Option<(f64, f64)>>),
}

impl Learner for NaiveBayes {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let n_classes = instances.n_classes();
		let class_weights = instances.class_weights();
		let total_weight: f64 = class_weights.iter().sum();
		let class_log_priors = class_weights
			.iter()
			.map(|weight| ((weight + 1.0) / (total_weight + n_classes as f64)).ln())
			.collect();
		let estimators = instances
			.attributes
			.iter()
			.enumerate()
			.map(|(attribute_index, attribute)| match attribute {
				Attribute::Enum { options, .. } => {
					discrete_estimator(instances, attribute_index, options.len())
				}
				Attribute::Number { .. } => normal_estimator(instances, attribute_index),
			})
			.collect();
		Ok(Box::new(NaiveBayesModel {
			class_log_priors,
			estimators,
		}))
	}
}

fn discrete_estimator(instances: &Instances, attribute_index: usize, n_options: usize) -> Estimator {
	let mut counts = Array2::from_elem((instances.n_classes(), n_options), 1.0);
	let column = instances.features.column(attribute_index);
	for ((value, label), weight) in column
		.iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		if let Some(option) = enum_index(*value, n_options) {
			counts[(*label, option)] += *weight as f64;
		}
	}
	for mut row in counts.genrows_mut() {
		let total = row.sum();
		row /= total;
	}
	Estimator::Discrete(counts)
}

/// The average gap between the distinct values of an attribute, which bounds how precisely its values were recorded.
fn precision(values: &mut Vec<f64>) -> f64 {
	values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
	values.dedup();
	if values.len() < 2 {
		return 0.01;
	}
	let range = values[values.len() - 1] - values[0];
	let precision = range / (values.len() - 1) as f64;
	if precision > 0.0 {
		precision
	} else {
		0.01
	}
}

fn normal_estimator(instances: &Instances, attribute_index: usize) -> Estimator {
	let n_classes = instances.n_classes();
	let column = instances.features.column(attribute_index);
	let mut known: Vec<f64> = column
		.iter()
		.filter(|value| !value.is_nan())
		.map(|value| *value as f64)
		.collect();
	let min_std = precision(&mut known) / 6.0;
	let mut sums = vec![(0.0, 0.0, 0.0); n_classes];
	for ((value, label), weight) in column
		.iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		if value.is_nan() || *weight <= 0.0 {
			continue;
		}
		let (value, weight) = (*value as f64, *weight as f64);
		let (sum_weights, sum, sum_squares) = &mut sums[*label];
		*sum_weights += weight;
		*sum += weight * value;
		*sum_squares += weight * value * value;
	}
	let parameters = sums
		.into_iter()
		.map(|(sum_weights, sum, sum_squares)| {
			if sum_weights <= 0.0 {
				return None;
			}
			let mean = sum / sum_weights;
			let variance = (sum_squares / sum_weights - mean * mean).max(0.0);
			Some((mean, variance.sqrt().max(min_std)))
		})
		.collect();
	Estimator::Normal(parameters)
}

fn log_normal_density(value: f64, mean: f64, std: f64) -> f64 {
	let z = (value - mean) / std;
	-0.5 * z * z - std.ln() - 0.5 * (2.0 * std::f64::consts::PI).ln()
}

impl Model for NaiveBayesModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.estimators.len(), example)?;
		let mut log_probabilities = self.class_log_priors.clone();
		for (estimator, value) in self.estimators.iter().zip(example.iter()) {
			match estimator {
				Estimator::Discrete(probabilities) => {
					if let Some(option) = enum_index(*value, probabilities.ncols()) {
						for (log_probability, row) in
							log_probabilities.iter_mut().zip(probabilities.genrows())
						{
							*log_probability += row[option].ln();
						}
					}
				}
				Estimator::Normal(parameters) => {
					if value.is_nan() {
						continue;
					}
					for (log_probability, parameters) in
						log_probabilities.iter_mut().zip(parameters.iter())
					{
						if let Some((mean, std)) = parameters {
							*log_probability += log_normal_density(*value as f64, *mean, *std);
						}
					}
				}
			}
		}
		Ok(softmax(&log_probabilities))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_weather() {
		let instances = datasets::weather();
		let model = NaiveBayes.train(&instances, 1).unwrap();
		// sunny, 66 degrees, 90% humidity, windy
		let example = arr1(&[0.0, 66.0, 90.0, 1.0]);
		let distribution = model.distribution(example.view()).unwrap();
		assert!((distribution[1] - 0.744).abs() < 1e-3);
		assert_eq!(model.predict(example.view()).unwrap(), 1);
	}

	#[test]
	fn test_missing_values_are_skipped() {
		let instances = datasets::weather();
		let model = NaiveBayes.train(&instances, 1).unwrap();
		let missing = Array1::from_elem(4, std::f32::NAN);
		let distribution = model.distribution(missing.view()).unwrap();
		// only the Laplace smoothed prior remains
		assert!((distribution[0] - 10.0 / 16.0).abs() < 1e-6);
	}

	#[test]
	fn test_precision() {
		assert_eq!(precision(&mut vec![1.0, 3.0, 2.0, 3.0]), 1.0);
		assert_eq!(precision(&mut vec![5.0]), 0.01);
	}
}
