/*!
This crate implements rule learners. [`ZeroR`](struct.ZeroR.html) always predicts the class distribution, [`OneR`](struct.OneR.html) picks the single attribute whose rule makes the fewest errors, [`PART`](struct.PART.html) and [`JRip`](struct.JRip.html) learn ordered lists of rules, and [`DecisionTable`](struct.DecisionTable.html) looks examples up in a table keyed by a selected subset of the attributes.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod decision_table;
mod jrip;
mod one_r;
mod part;
mod rule;
mod zero_r;

pub use self::decision_table::{DecisionTable, DecisionTableModel};
pub use self::jrip::JRip;
pub use self::one_r::{OneR, OneRModel};
pub use self::part::PART;
pub use self::rule::{Condition, Rule, RuleList};
pub use self::zero_r::{ZeroR, ZeroRModel};

#[cfg(test)]
mod test {
	use super::*;
	use ndarray::prelude::*;
	use suinz_model::{datasets, Learner};

	fn check_learner(learner: &dyn Learner, min_accuracy: f32) {
		let instances = datasets::blobs();
		let model = learner.train(&instances, 1).unwrap();
		let accuracy = datasets::training_accuracy(model.as_ref(), &instances);
		assert!(
			accuracy >= min_accuracy,
			"{:?} has training accuracy {}",
			learner,
			accuracy
		);
		let weather = datasets::weather();
		let model = learner.train(&weather, 1).unwrap();
		for example in weather.features.genrows() {
			let distribution = model.distribution(example).unwrap();
			assert_eq!(distribution.len(), 2);
			assert!((distribution.sum() - 1.0).abs() < 1e-4);
		}
		let missing = Array1::from_elem(4, std::f32::NAN);
		let distribution = model.distribution(missing.view()).unwrap();
		assert!((distribution.sum() - 1.0).abs() < 1e-4);
	}

	#[test]
	fn test_learners() {
		check_learner(&ZeroR, 0.33);
		check_learner(&OneR::default(), 0.95);
		check_learner(&PART::default(), 0.95);
		check_learner(&JRip::default(), 0.9);
		check_learner(&DecisionTable::default(), 0.95);
	}

	#[test]
	fn test_consecutive_float_values() {
		let instances = datasets::adjacent_values();
		for learner in [
			&OneR::default() as &dyn Learner,
			&PART::default(),
			&JRip::default(),
			&DecisionTable::default(),
		]
		.iter()
		{
			let model = learner.train(&instances, 1).unwrap();
			for example in instances.features.genrows() {
				let distribution = model.distribution(example).unwrap();
				assert!((distribution.sum() - 1.0).abs() < 1e-4, "{:?}", learner);
			}
		}
	}
}
