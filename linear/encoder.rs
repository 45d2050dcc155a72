use ndarray::prelude::*;
use suinz_model::{enum_index, Attribute, Instances};

/// How a `FeatureEncoder` scales number attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scaling {
	/// Subtract the mean and divide by the standard deviation.
	Standardize,
	/// Map the training range to [0, 1].
	Normalize,
}

/**
A `FeatureEncoder` turns examples into dense numeric feature vectors. A missing number value is replaced by the training mean and a missing enum value by the most frequent option. Each enum attribute becomes one indicator feature per option.
*/
#[derive(Clone, Debug)]
pub struct FeatureEncoder {
	columns: Vec<ColumnEncoder>,
	n_features: usize,
}

#[derive(Clone, Debug)]
enum ColumnEncoder {
	Number { fill: f32, offset: f32, scale: f32 },
	Enum { fill: usize, n_options: usize },
}

impl FeatureEncoder {
	pub fn fit(instances: &Instances, scaling: Scaling) -> Self {
		let columns: Vec<ColumnEncoder> = instances
			.attributes
			.iter()
			.zip(instances.features.gencolumns())
			.map(|(attribute, column)| {
				let known = column
					.iter()
					.zip(instances.weights.iter())
					.filter(|(value, _)| !value.is_nan())
					.map(|(value, weight)| (*value as f64, *weight as f64));
				match attribute {
					Attribute::Number { .. } => fit_number(known, scaling),
					Attribute::Enum { options, .. } => {
						let n_options = options.len();
						let mut counts = vec![0.0; n_options];
						for (value, weight) in known {
							if let Some(option) = enum_index(value as f32, n_options) {
								counts[option] += weight;
							}
						}
						let mut fill = 0;
						for (option, count) in counts.iter().enumerate() {
							if *count > counts[fill] {
								fill = option;
							}
						}
						ColumnEncoder::Enum { fill, n_options }
					}
				}
			})
			.collect();
		let n_features = columns
			.iter()
			.map(|column| match column {
				ColumnEncoder::Number { .. } => 1,
				ColumnEncoder::Enum { n_options, .. } => *n_options,
			})
			.sum();
		Self {
			columns,
			n_features,
		}
	}

	pub fn n_features(&self) -> usize {
		self.n_features
	}

	pub fn encode_example(&self, example: ArrayView1<f32>) -> Array1<f32> {
		let mut features = Array1::zeros(self.n_features);
		self.encode_into(example, features.view_mut());
		features
	}

	pub fn encode(&self, instances: &Instances) -> Array2<f32> {
		let mut features = Array2::zeros((instances.n_examples(), self.n_features));
		for (example, row) in instances
			.features
			.genrows()
			.into_iter()
			.zip(features.genrows_mut())
		{
			self.encode_into(example, row);
		}
		features
	}

	fn encode_into(&self, example: ArrayView1<f32>, mut features: ArrayViewMut1<f32>) {
		let mut feature_index = 0;
		for (column, value) in self.columns.iter().zip(example.iter()) {
			match column {
				ColumnEncoder::Number {
					fill,
					offset,
					scale,
				} => {
					let value = if value.is_nan() { *fill } else { *value };
					features[feature_index] = (value - offset) / scale;
					feature_index += 1;
				}
				ColumnEncoder::Enum { fill, n_options } => {
					let option = enum_index(*value, *n_options).unwrap_or(*fill);
					if option < *n_options {
						features[feature_index + option] = 1.0;
					}
					feature_index += n_options;
				}
			}
		}
	}
}

fn fit_number(known: impl Iterator<Item = (f64, f64)>, scaling: Scaling) -> ColumnEncoder {
	let mut sum_weights = 0.0;
	let mut sum = 0.0;
	let mut sum_squares = 0.0;
	let mut min = std::f64::INFINITY;
	let mut max = std::f64::NEG_INFINITY;
	for (value, weight) in known {
		sum_weights += weight;
		sum += weight * value;
		sum_squares += weight * value * value;
		min = min.min(value);
		max = max.max(value);
	}
	if sum_weights <= 0.0 {
		return ColumnEncoder::Number {
			fill: 0.0,
			offset: 0.0,
			scale: 1.0,
		};
	}
	let mean = sum / sum_weights;
	let (offset, scale) = match scaling {
		Scaling::Standardize => {
			let std = (sum_squares / sum_weights - mean * mean).max(0.0).sqrt();
			(mean, std)
		}
		Scaling::Normalize => (min, max - min),
	};
	ColumnEncoder::Number {
		fill: mean as f32,
		offset: offset as f32,
		scale: if scale > 1e-10 { scale as f32 } else { 1.0 },
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_encode() {
		let instances = datasets::weather();
		let encoder = FeatureEncoder::fit(&instances, Scaling::Normalize);
		// 3 outlook options, temperature, humidity, 2 windy options
		assert_eq!(encoder.n_features(), 7);
		let features = encoder.encode(&instances);
		assert_eq!(features.row(0).to_vec(), vec![1.0, 0.0, 0.0, 1.0, 20.0 / 31.0, 1.0, 0.0]);
	}

	#[test]
	fn test_missing_values_are_filled() {
		let instances = datasets::weather();
		let encoder = FeatureEncoder::fit(&instances, Scaling::Standardize);
		let missing = Array1::from_elem(4, std::f32::NAN);
		let features = encoder.encode_example(missing.view());
		// sunny and rainy are tied for the most frequent outlook, and ties go to the first
		assert_eq!(features[0], 1.0);
		assert!(features[3].abs() < 1e-5);
		assert!(features[4].abs() < 1e-5);
		// windy is false more often
		assert_eq!(features[5], 1.0);
	}
}
