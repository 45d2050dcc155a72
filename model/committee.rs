use crate::{normalize, Model, PredictError};
use ndarray::prelude::*;

/// A `Committee` predicts the average of its members' distributions.
#[derive(Debug)]
pub struct Committee {
	pub members: Vec<Box<dyn Model>>,
	pub n_classes: usize,
}

impl Model for Committee {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		let mut distribution = Array1::<f32>::zeros(self.n_classes);
		for member in self.members.iter() {
			distribution += &member.distribution(example)?;
		}
		normalize(&mut distribution);
		Ok(distribution)
	}
}

#[test]
fn test_committee_averages() {
	#[derive(Debug)]
	struct Constant(Array1<f32>);
	impl Model for Constant {
		fn distribution(&self, _: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
			Ok(self.0.clone())
		}
	}
	let committee = Committee {
		members: vec![
			Box::new(Constant(arr1(&[1.0, 0.0]))),
			Box::new(Constant(arr1(&[0.5, 0.5]))),
		],
		n_classes: 2,
	};
	let distribution = committee.distribution(arr1(&[0.0]).view()).unwrap();
	assert_eq!(distribution, arr1(&[0.75, 0.25]));
}
