/*!
This crate implements ensemble learners, which combine the models of other learners. [`AdaBoostM1`](struct.AdaBoostM1.html) and [`LogitBoost`](struct.LogitBoost.html) boost weak learners, while [`Bagging`](struct.Bagging.html), [`RandomCommittee`](struct.RandomCommittee.html) and [`RandomSubSpace`](struct.RandomSubSpace.html) average models trained on perturbed versions of the training data.

Every ensemble draws the seed of each member from its own seed, so training is reproducible.
*/

#![allow(clippy::tabs_in_doc_comments)]

use ndarray::prelude::*;

mod ada_boost;
mod bagging;
mod logit_boost;
mod random_committee;
mod random_subspace;
mod regression_stump;

pub use self::ada_boost::{AdaBoostM1, AdaBoostM1Model};
pub use self::bagging::Bagging;
pub use self::logit_boost::{LogitBoost, LogitBoostModel};
pub use self::random_committee::RandomCommittee;
pub use self::random_subspace::{RandomSubSpace, SubspaceModel};
pub use self::regression_stump::{RegressionStump, RegressionStumpTest};

fn softmax(scores: ArrayView1<f64>) -> Array1<f64> {
	let max = scores.iter().cloned().fold(std::f64::NEG_INFINITY, f64::max);
	let mut probabilities = scores.mapv(|score| (score - max).exp());
	let sum = probabilities.sum();
	probabilities /= sum;
	probabilities
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::{datasets, Learner};

	#[test]
	fn test_softmax() {
		let probabilities = softmax(arr1(&[0.0, 2.0f64.ln()]).view());
		assert!((probabilities[1] - 2.0 / 3.0).abs() < 1e-10);
	}

	#[test]
	fn test_learners() {
		let learners: Vec<Box<dyn Learner>> = vec![
			Box::new(AdaBoostM1::default()),
			Box::new(Bagging::default()),
			Box::new(LogitBoost::default()),
			Box::new(RandomCommittee::default()),
			Box::new(RandomSubSpace::default()),
		];
		let weather = datasets::weather();
		let missing = Array1::from_elem(4, std::f32::NAN);
		for learner in learners.iter() {
			let a = learner.train(&weather, 1).unwrap();
			let b = learner.train(&weather, 1).unwrap();
			for example in weather.features.genrows() {
				let distribution = a.distribution(example).unwrap();
				assert_eq!(distribution.len(), 2);
				assert!((distribution.sum() - 1.0).abs() < 1e-4, "{:?}", learner);
				assert_eq!(distribution, b.distribution(example).unwrap());
			}
			let distribution = a.distribution(missing.view()).unwrap();
			assert!((distribution.sum() - 1.0).abs() < 1e-4, "{:?}", learner);
		}
	}

	#[test]
	fn test_consecutive_float_values() {
		let instances = datasets::adjacent_values();
		let model = LogitBoost::default().train(&instances, 1).unwrap();
		for example in instances.features.genrows() {
			let distribution = model.distribution(example).unwrap();
			assert!((distribution.sum() - 1.0).abs() < 1e-4);
		}
	}
}
