use ndarray::prelude::*;
use suinz_model::{check_example, Instances, Learner, Model, PredictError, TrainError};

/// ZeroR ignores the attributes and predicts the class distribution of the training data, with one added to each class count.
#[derive(Clone, Debug, Default)]
pub struct ZeroR;

#[derive(Clone, Debug)]
pub struct ZeroRModel {
	pub distribution: Array1<f32>,
	n_attributes: usize,
}

impl Learner for ZeroR {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let class_counts: Vec<f64> = instances
			.class_weights()
			.iter()
			.map(|weight| weight + 1.0)
			.collect();
		Ok(Box::new(ZeroRModel {
			distribution: crate::rule::to_distribution(&class_counts),
			n_attributes: instances.n_attributes(),
		}))
	}
}

impl Model for ZeroRModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		Ok(self.distribution.clone())
	}
}

#[test]
fn test_zero_r() {
	let instances = suinz_model::datasets::weather();
	let model = ZeroR.train(&instances, 1).unwrap();
	let example = instances.features.row(0);
	assert_eq!(model.predict(example).unwrap(), 0);
	let distribution = model.distribution(example).unwrap();
	assert!((distribution[0] - 10.0 / 16.0).abs() < 1e-6);
}
