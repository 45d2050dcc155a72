use ndarray::prelude::*;
use suinz_model::{
	check_example, enum_index, normalize, Attribute, Instances, Learner, Model, PredictError,
	TrainError,
};

/**
KStar classifies by the entropic distance of Cleary and Trigg. The probability of each class is the sum, over the training instances of that class, of the probability of transforming the example into the instance. Attributes transform independently.

For each attribute the sharpness of the transformation is chosen per example so the effective number of training instances it reaches is `n0 + global_blend * (n - n0)`, where `n0` is the number of instances at distance zero.
*/
#[derive(Clone, Debug)]
pub struct KStar {
	/// Between 0 and 1. Larger values blend more distant instances into the prediction.
	pub global_blend: f64,
}

impl Default for KStar {
	fn default() -> Self {
		Self { global_blend: 0.2 }
	}
}

#[derive(Clone, Debug)]
pub struct KStarModel {
	global_blend: f64,
	instances: Instances,
	/// The relative frequency of each option of each enum attribute.
	frequencies: Vec<Option<Vec<f64>>>,
}

impl Learner for KStar {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let frequencies = instances
			.attributes
			.iter()
			.zip(instances.features.gencolumns())
			.map(|(attribute, column)| match attribute {
				Attribute::Enum { options, .. } => {
					let mut counts = vec![0.0; options.len()];
					for value in column.iter() {
						if let Some(option) = enum_index(*value, options.len()) {
							counts[option] += 1.0;
						}
					}
					let total: f64 = counts.iter().sum();
					if total > 0.0 {
						counts.iter_mut().for_each(|count| *count /= total);
					}
					Some(counts)
				}
				Attribute::Number { .. } => None,
			})
			.collect();
		Ok(Box::new(KStarModel {
			global_blend: self.global_blend.max(0.0).min(1.0),
			instances: instances.clone(),
			frequencies,
		}))
	}
}

/// The effective number of instances reached by transformation probabilities `p`.
fn sphere_size(p: &[f64]) -> f64 {
	let sum: f64 = p.iter().sum();
	let sum_squares: f64 = p.iter().map(|p| p * p).sum();
	if sum_squares > 0.0 {
		sum * sum / sum_squares
	} else {
		0.0
	}
}

/// Find the parameter in [low, high] at which `size` reaches `target`, assuming `size` decreases as the parameter grows.
fn bisect(mut low: f64, mut high: f64, target: f64, size: impl Fn(f64) -> f64) -> f64 {
	for _ in 0..60 {
		let middle = 0.5 * (low + high);
		if size(middle) > target {
			low = middle;
		} else {
			high = middle;
		}
	}
	0.5 * (low + high)
}

impl KStarModel {
	fn target_size(&self, n: usize, n0: usize) -> f64 {
		n0 as f64 + self.global_blend * (n - n0) as f64
	}

	/// The probability of transforming `value` into each training value of the attribute at `attribute_index`, or `None` if `value` is missing.
	fn transformation_probabilities(&self, attribute_index: usize, value: f32) -> Option<Vec<f64>> {
		if value.is_nan() {
			return None;
		}
		let column = self.instances.features.column(attribute_index);
		let mut probabilities: Vec<Option<f64>> = match &self.frequencies[attribute_index] {
			Some(frequencies) => {
				let n_options = frequencies.len();
				let option = enum_index(value, n_options)?;
				let known: Vec<usize> = column
					.iter()
					.filter_map(|value| enum_index(*value, n_options))
					.collect();
				let n0 = known.iter().filter(|known| **known == option).count();
				let target = self.target_size(known.len(), n0);
				let probability = |stop: f64, known: usize| {
					let same = if known == option { stop } else { 0.0 };
					same + (1.0 - stop) * frequencies[known]
				};
				let stop = bisect(0.0, 1.0, target, |stop| {
					let p: Vec<f64> = known.iter().map(|known| probability(stop, *known)).collect();
					sphere_size(&p)
				});
				column
					.iter()
					.map(|value| enum_index(*value, n_options).map(|known| probability(stop, known)))
					.collect()
			}
			None => {
				let differences: Vec<f64> = column
					.iter()
					.filter(|value| !value.is_nan())
					.map(|known| (*known as f64 - value as f64).abs())
					.collect();
				let n0 = differences.iter().filter(|difference| **difference == 0.0).count();
				let target = self.target_size(differences.len(), n0);
				let max_difference = differences.iter().cloned().fold(0.0, f64::max);
				let scale = if max_difference > 0.0 {
					// Search the log of the scale, which spans many orders of magnitude.
					let log_scale = bisect(-20.0, 20.0, target, |log_scale| {
						let scale = log_scale.exp() / max_difference;
						let p: Vec<f64> = differences
							.iter()
							.map(|difference| (-difference * scale).exp())
							.collect();
						sphere_size(&p)
					});
					log_scale.exp() / max_difference
				} else {
					0.0
				};
				column
					.iter()
					.map(|known| {
						if known.is_nan() {
							None
						} else {
							Some((-(*known as f64 - value as f64).abs() * scale).exp())
						}
					})
					.collect()
			}
		};
		// Training instances missing this attribute get the average probability.
		let known: Vec<f64> = probabilities.iter().filter_map(|p| *p).collect();
		let average = if known.is_empty() {
			1.0
		} else {
			known.iter().sum::<f64>() / known.len() as f64
		};
		Some(
			probabilities
				.drain(..)
				.map(|p| p.unwrap_or(average))
				.collect(),
		)
	}
}

impl Model for KStarModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.instances.n_attributes(), example)?;
		let n_examples = self.instances.n_examples();
		let mut log_probabilities = vec![0.0f64; n_examples];
		for (attribute_index, value) in example.iter().enumerate() {
			if let Some(probabilities) = self.transformation_probabilities(attribute_index, *value)
			{
				for (log_probability, p) in log_probabilities.iter_mut().zip(probabilities.iter()) {
					*log_probability += p.max(std::f64::MIN_POSITIVE).ln();
				}
			}
		}
		let max = log_probabilities
			.iter()
			.cloned()
			.fold(std::f64::NEG_INFINITY, f64::max);
		let mut distribution = Array1::<f32>::zeros(self.instances.n_classes());
		for ((log_probability, label), weight) in log_probabilities
			.iter()
			.zip(self.instances.labels.iter())
			.zip(self.instances.weights.iter())
		{
			distribution[*label] += ((log_probability - max).exp() * *weight as f64) as f32;
		}
		normalize(&mut distribution);
		Ok(distribution)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_sphere_size() {
		assert_eq!(sphere_size(&[1.0, 1.0, 1.0, 1.0]), 4.0);
		assert_eq!(sphere_size(&[1.0, 0.0, 0.0]), 1.0);
	}

	#[test]
	fn test_blend_sets_sphere_size() {
		let instances = datasets::blobs();
		let model = KStarModel {
			global_blend: 0.2,
			instances: instances.clone(),
			frequencies: vec![None, None, Some(vec![0.5, 0.5])],
		};
		let p = model.transformation_probabilities(0, 2.55).unwrap();
		// no instance has x = 2.55, so the sphere should hold 20% of the 60 instances
		assert!((sphere_size(&p) - 12.0).abs() < 1e-3);
		assert!(model.transformation_probabilities(0, std::f32::NAN).is_none());
	}

	#[test]
	fn test_separates_blobs() {
		let instances = datasets::blobs();
		let model = KStar::default().train(&instances, 1).unwrap();
		let accuracy = datasets::training_accuracy(model.as_ref(), &instances);
		assert!(accuracy > 0.9);
	}
}
