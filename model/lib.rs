/*!
This crate defines the interface shared by every classification algorithm. A [`Learner`](trait.Learner.html) holds an algorithm's options and trains on [`Instances`](struct.Instances.html) to produce a [`Model`](trait.Model.html), which predicts a class distribution for an example.

Examples are rows of `f32` values, one per attribute. The value of an enum attribute is the index of its option, and a missing value of either kind is NaN.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod committee;
pub mod datasets;
pub mod discretize;
mod error;
mod instances;
pub mod math;

pub use self::committee::Committee;
pub use self::error::{PredictError, TrainError};
pub use self::instances::{Attribute, Encoded, Instances, Schema};

use ndarray::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::fmt::Debug;

/// A `Learner` is an untrained classification algorithm together with its options.
pub trait Learner: Debug + Send + Sync {
	/// Train a model on `instances`. Randomized learners draw all their randomness from `seed`, so training twice with the same seed produces the same model.
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError>;

	/// Whether training takes the instance weights into account. Ensembles resample the instances for learners that do not.
	fn handles_weights(&self) -> bool {
		true
	}
}

/// A `Model` is a trained classifier.
pub trait Model: Debug + Send + Sync {
	/// Compute the probability of each class for `example`. The returned distribution has one entry per class and sums to one.
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError>;

	/// Predict the most probable class for `example`. Ties go to the class with the lowest index.
	fn predict(&self, example: ArrayView1<f32>) -> Result<usize, PredictError> {
		let distribution = self.distribution(example)?;
		Ok(suinz_metrics::argmax(distribution.view()))
	}
}

/// Create the random number generator every randomized learner uses.
pub fn rng(seed: u64) -> Xoshiro256Plus {
	Xoshiro256Plus::seed_from_u64(seed)
}

/// Return an error if `example` does not have one value per attribute.
pub fn check_example(n_attributes: usize, example: ArrayView1<f32>) -> Result<(), PredictError> {
	if example.len() == n_attributes {
		Ok(())
	} else {
		Err(PredictError::DimensionMismatch {
			expected: n_attributes,
			actual: example.len(),
		})
	}
}

/// The option index of an enum value, or `None` if the value is missing or out of range.
pub fn enum_index(value: f32, n_options: usize) -> Option<usize> {
	if value.is_nan() || value < 0.0 {
		return None;
	}
	let index = value as usize;
	if index < n_options {
		Some(index)
	} else {
		None
	}
}

/// Scale `distribution` so it sums to one. A distribution that sums to zero, or to something that is not finite, becomes uniform.
pub fn normalize(distribution: &mut Array1<f32>) {
	let sum = distribution.sum();
	if sum > 0.0 && sum.is_finite() {
		*distribution /= sum;
	} else if !distribution.is_empty() {
		let n = distribution.len() as f32;
		distribution.fill(1.0 / n);
	}
}

/// The threshold between two consecutive distinct values, used with `value <= threshold`. When the values are adjacent floats their midpoint rounds onto `next_value`, so the lower value is returned instead.
pub fn midpoint(value: f32, next_value: f32) -> f32 {
	let midpoint = value + (next_value - value) / 2.0;
	if midpoint < next_value {
		midpoint
	} else {
		value
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[derive(Debug)]
	struct Constant(Array1<f32>);

	impl Model for Constant {
		fn distribution(&self, _example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
			Ok(self.0.clone())
		}
	}

	#[test]
	fn test_predict_ties_go_to_lowest_index() {
		let model = Constant(arr1(&[0.2, 0.4, 0.4]));
		assert_eq!(model.predict(arr1(&[1.0]).view()).unwrap(), 1);
	}

	#[test]
	fn test_normalize() {
		let mut distribution = arr1(&[1.0, 3.0]);
		normalize(&mut distribution);
		assert_eq!(distribution, arr1(&[0.25, 0.75]));
		let mut distribution = arr1(&[0.0, 0.0, 0.0, 0.0]);
		normalize(&mut distribution);
		assert_eq!(distribution, arr1(&[0.25, 0.25, 0.25, 0.25]));
	}

	#[test]
	fn test_midpoint() {
		assert_eq!(midpoint(1.0, 2.0), 1.5);
		let value = -0.4f32;
		let next_value = -0.39999998f32;
		assert!(value < next_value);
		let threshold = midpoint(value, next_value);
		assert!(value <= threshold && threshold < next_value);
		let next_value = f32::from_bits(1.0f32.to_bits() + 1);
		assert_eq!(midpoint(1.0, next_value), 1.0);
	}

	#[test]
	fn test_check_example() {
		assert!(check_example(2, arr1(&[1.0, 2.0]).view()).is_ok());
		assert!(matches!(
			check_example(3, arr1(&[1.0]).view()),
			Err(PredictError::DimensionMismatch {
				expected: 3,
				actual: 1
			})
		));
	}
}
