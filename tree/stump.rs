use ndarray::prelude::*;
use std::cmp::Ordering;
use suinz_model::{
	check_example, enum_index, math::conditional_entropy, midpoint, normalize, Attribute, Instances,
	Learner, Model, PredictError, TrainError,
};

/// A DecisionStump is a one level tree. It splits on a single attribute into three branches: one for examples matching the test, one for the rest, and one for examples whose value is missing.
#[derive(Clone, Debug, Default)]
pub struct DecisionStump;

#[derive(Clone, Debug, PartialEq)]
pub enum StumpTest {
	/// The value of an enum attribute equals this option.
	Equals(usize),
	/// The value of a number attribute is less than or equal to this threshold.
	LessOrEqual(f32),
}

#[derive(Clone, Debug)]
pub struct StumpModel {
	pub attribute_index: usize,
	pub test: StumpTest,
	/// The class distributions of the matching, non matching and missing branches.
	pub distributions: [Array1<f32>; 3],
	pub n_attributes: usize,
}

impl Learner for DecisionStump {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let n_classes = instances.n_classes();
		let mut best: Option<(f64, usize, StumpTest, [Vec<f64>; 3])> = None;
		for (attribute_index, attribute) in instances.attributes.iter().enumerate() {
			let candidates = match attribute {
				Attribute::Enum { options, .. } => {
					enum_candidates(instances, attribute_index, options.len())
				}
				Attribute::Number { .. } => number_candidates(instances, attribute_index),
			};
			for (test, counts) in candidates {
				let score = conditional_entropy(&counts);
				if best.as_ref().map(|best| score < best.0).unwrap_or(true) {
					best = Some((score, attribute_index, test, counts));
				}
			}
		}
		let overall = instances.class_weights();
		let (attribute_index, test, counts) = match best {
			Some((_, attribute_index, test, counts)) => (attribute_index, test, counts),
			// Without a usable attribute every branch predicts the class distribution.
			None => (
				0,
				StumpTest::LessOrEqual(std::f32::INFINITY),
				[overall.clone(), overall.clone(), overall.clone()],
			),
		};
		let to_distribution = |counts: &[f64]| -> Array1<f32> {
			let counts = if counts.iter().sum::<f64>() > 0.0 {
				counts
			} else {
				overall.as_slice()
			};
			let mut distribution: Array1<f32> = counts.iter().map(|count| *count as f32).collect();
			normalize(&mut distribution);
			distribution
		};
		let distributions = [
			to_distribution(&counts[0]),
			to_distribution(&counts[1]),
			to_distribution(&counts[2]),
		];
		debug_assert!(distributions.iter().all(|d| d.len() == n_classes));
		Ok(Box::new(StumpModel {
			attribute_index,
			test,
			distributions,
			n_attributes: instances.n_attributes(),
		}))
	}
}

fn enum_candidates(
	instances: &Instances,
	attribute_index: usize,
	n_options: usize,
) -> Vec<(StumpTest, [Vec<f64>; 3])> {
	let n_classes = instances.n_classes();
	let mut by_option = vec![vec![0.0; n_classes]; n_options];
	let mut missing = vec![0.0; n_classes];
	let mut total = vec![0.0; n_classes];
	for ((value, label), weight) in instances
		.features
		.column(attribute_index)
		.iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		let weight = *weight as f64;
		match enum_index(*value, n_options) {
			Some(option) => {
				by_option[option][*label] += weight;
				total[*label] += weight;
			}
			None => missing[*label] += weight,
		}
	}
	by_option
		.into_iter()
		.enumerate()
		.map(|(option, matching)| {
			let rest: Vec<f64> = total
				.iter()
				.zip(matching.iter())
				.map(|(total, matching)| total - matching)
				.collect();
			(
				StumpTest::Equals(option),
				[matching, rest, missing.clone()],
			)
		})
		.collect()
}

fn number_candidates(
	instances: &Instances,
	attribute_index: usize,
) -> Vec<(StumpTest, [Vec<f64>; 3])> {
	let n_classes = instances.n_classes();
	let mut known = Vec::new();
	let mut missing = vec![0.0; n_classes];
	for ((value, label), weight) in instances
		.features
		.column(attribute_index)
		.iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		if value.is_nan() {
			missing[*label] += *weight as f64;
		} else {
			known.push((*value, *label, *weight as f64));
		}
	}
	known.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
	let mut left = vec![0.0; n_classes];
	let mut right = vec![0.0; n_classes];
	for (_, label, weight) in known.iter() {
		right[*label] += weight;
	}
	let mut candidates = Vec::new();
	for index in 0..known.len().saturating_sub(1) {
		let (value, label, weight) = known[index];
		left[label] += weight;
		right[label] -= weight;
		let next_value = known[index + 1].0;
		if value < next_value {
			candidates.push((
				StumpTest::LessOrEqual(midpoint(value, next_value)),
				[left.clone(), right.clone(), missing.clone()],
			));
		}
	}
	candidates
}

impl StumpModel {
	fn branch(&self, value: f32) -> usize {
		if value.is_nan() {
			return 2;
		}
		let matches = match self.test {
			StumpTest::Equals(option) => value >= 0.0 && value as usize == option,
			StumpTest::LessOrEqual(threshold) => value <= threshold,
		};
		if matches {
			0
		} else {
			1
		}
	}
}

impl Model for StumpModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		let value = example
			.get(self.attribute_index)
			.cloned()
			.unwrap_or(std::f32::NAN);
		Ok(self.distributions[self.branch(value)].clone())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_weather_stump() {
		let instances = datasets::weather();
		let model = DecisionStump.train(&instances, 1).unwrap();
		// overcast days are always "yes"
		let overcast = arr1(&[1.0, 70.0, 70.0, 0.0]);
		assert_eq!(model.predict(overcast.view()).unwrap(), 0);
		let distribution = model.distribution(overcast.view()).unwrap();
		assert!((distribution[0] - 1.0).abs() < 1e-6);
	}

	#[test]
	fn test_missing_branch_uses_overall_distribution() {
		let instances = datasets::weather();
		let model = DecisionStump.train(&instances, 1).unwrap();
		let missing = Array1::from_elem(4, std::f32::NAN);
		let distribution = model.distribution(missing.view()).unwrap();
		assert!((distribution[0] - 9.0 / 14.0).abs() < 1e-6);
	}

	#[test]
	fn test_weights_change_the_split() {
		let instances = datasets::blobs();
		let model = DecisionStump.train(&instances, 1).unwrap();
		let low_x = arr1(&[0.5, 0.0, 0.0]);
		let high_x = arr1(&[4.5, 0.0, 0.0]);
		assert_ne!(
			model.predict(low_x.view()).unwrap(),
			model.predict(high_x.view()).unwrap()
		);
		let weights = instances
			.labels
			.iter()
			.map(|label| if *label == 1 { 1.0 } else { 0.0 })
			.collect();
		let model = DecisionStump
			.train(&instances.with_weights(weights), 1)
			.unwrap();
		assert_eq!(model.predict(low_x.view()).unwrap(), 1);
	}
}
