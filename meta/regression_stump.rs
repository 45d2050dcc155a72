use ndarray::prelude::*;
use std::cmp::Ordering;
use suinz_model::{enum_index, midpoint, Attribute, Instances};

/// A one level regression tree fit by weighted least squares. Like a decision stump it has a branch for examples matching the test, one for the rest, and one for examples whose value is missing.
#[derive(Clone, Debug)]
pub struct RegressionStump {
	pub attribute_index: usize,
	pub test: RegressionStumpTest,
	/// The outputs of the matching, non matching and missing branches.
	pub outputs: [f64; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub enum RegressionStumpTest {
	Equals(usize),
	LessOrEqual(f32),
}

/// The weight and weighted sum of the targets in a branch.
#[derive(Clone, Copy, Debug, Default)]
struct Moments {
	weight: f64,
	sum: f64,
}

impl Moments {
	fn add(&mut self, target: f64, weight: f64) {
		self.weight += weight;
		self.sum += weight * target;
	}

	/// The reduction in the sum of squared errors from predicting the mean instead of zero.
	fn score(&self) -> f64 {
		if self.weight > 0.0 {
			self.sum * self.sum / self.weight
		} else {
			0.0
		}
	}

	fn mean(&self) -> Option<f64> {
		if self.weight > 0.0 {
			Some(self.sum / self.weight)
		} else {
			None
		}
	}
}

impl RegressionStump {
	pub fn fit(instances: &Instances, targets: &[f64], weights: &[f64]) -> Self {
		let mut overall = Moments::default();
		for (target, weight) in targets.iter().zip(weights.iter()) {
			overall.add(*target, *weight);
		}
		let mut best: Option<(f64, usize, RegressionStumpTest, [Moments; 3])> = None;
		for (attribute_index, attribute) in instances.attributes.iter().enumerate() {
			let column = instances.features.column(attribute_index);
			let candidates = match attribute {
				Attribute::Enum { options, .. } => {
					enum_candidates(column, targets, weights, options.len())
				}
				Attribute::Number { .. } => number_candidates(column, targets, weights),
			};
			for (test, moments) in candidates {
				let score: f64 = moments.iter().map(|moments| moments.score()).sum();
				if best.as_ref().map(|best| score > best.0).unwrap_or(true) {
					best = Some((score, attribute_index, test, moments));
				}
			}
		}
		let overall_mean = overall.mean().unwrap_or(0.0);
		match best {
			Some((_, attribute_index, test, moments)) => Self {
				attribute_index,
				test,
				outputs: [
					moments[0].mean().unwrap_or(overall_mean),
					moments[1].mean().unwrap_or(overall_mean),
					moments[2].mean().unwrap_or(overall_mean),
				],
			},
			None => Self {
				attribute_index: 0,
				test: RegressionStumpTest::LessOrEqual(std::f32::INFINITY),
				outputs: [overall_mean; 3],
			},
		}
	}

	pub fn predict(&self, example: ArrayView1<f32>) -> f64 {
		let value = example
			.get(self.attribute_index)
			.cloned()
			.unwrap_or(std::f32::NAN);
		if value.is_nan() {
			return self.outputs[2];
		}
		let matches = match self.test {
			RegressionStumpTest::Equals(option) => value >= 0.0 && value as usize == option,
			RegressionStumpTest::LessOrEqual(threshold) => value <= threshold,
		};
		if matches {
			self.outputs[0]
		} else {
			self.outputs[1]
		}
	}
}

fn enum_candidates(
	column: ArrayView1<f32>,
	targets: &[f64],
	weights: &[f64],
	n_options: usize,
) -> Vec<(RegressionStumpTest, [Moments; 3])> {
	let mut by_option = vec![Moments::default(); n_options];
	let mut known = Moments::default();
	let mut missing = Moments::default();
	for ((value, target), weight) in column.iter().zip(targets.iter()).zip(weights.iter()) {
		match enum_index(*value, n_options) {
			Some(option) => {
				by_option[option].add(*target, *weight);
				known.add(*target, *weight);
			}
			None => missing.add(*target, *weight),
		}
	}
	by_option
		.into_iter()
		.enumerate()
		.map(|(option, matching)| {
			let rest = Moments {
				weight: known.weight - matching.weight,
				sum: known.sum - matching.sum,
			};
			(RegressionStumpTest::Equals(option), [matching, rest, missing])
		})
		.collect()
}

fn number_candidates(
	column: ArrayView1<f32>,
	targets: &[f64],
	weights: &[f64],
) -> Vec<(RegressionStumpTest, [Moments; 3])> {
	let mut known: Vec<(f32, f64, f64)> = Vec::new();
	let mut missing = Moments::default();
	let mut total = Moments::default();
	for ((value, target), weight) in column.iter().zip(targets.iter()).zip(weights.iter()) {
		if value.is_nan() {
			missing.add(*target, *weight);
		} else {
			known.push((*value, *target, *weight));
			total.add(*target, *weight);
		}
	}
	known.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
	let mut left = Moments::default();
	let mut candidates = Vec::new();
	for index in 0..known.len().saturating_sub(1) {
		let (value, target, weight) = known[index];
		left.add(target, weight);
		let next_value = known[index + 1].0;
		if value < next_value {
			let right = Moments {
				weight: total.weight - left.weight,
				sum: total.sum - left.sum,
			};
			candidates.push((
				RegressionStumpTest::LessOrEqual(midpoint(value, next_value)),
				[left, right, missing],
			));
		}
	}
	candidates
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_fit() {
		let instances = datasets::blobs();
		// the target is 1 for the last class and -1 otherwise
		let targets: Vec<f64> = instances
			.labels
			.iter()
			.map(|label| if *label == 2 { 1.0 } else { -1.0 })
			.collect();
		let weights = vec![1.0; instances.n_examples()];
		let stump = RegressionStump::fit(&instances, &targets, &weights);
		assert_eq!(stump.attribute_index, 0);
		assert_eq!(stump.outputs[0], -1.0);
		assert_eq!(stump.outputs[1], 1.0);
		// no missing values, so the missing branch predicts the mean
		assert!((stump.outputs[2] + 1.0 / 3.0).abs() < 1e-10);
		assert_eq!(stump.predict(arr1(&[4.5, 0.0, 0.0]).view()), 1.0);
	}
}
