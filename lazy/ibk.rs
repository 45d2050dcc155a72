use crate::EuclideanDistance;
use ndarray::prelude::*;
use std::cmp::Ordering;
use suinz_model::{check_example, normalize, Instances, Learner, Model, PredictError, TrainError};

/// IBk is a k nearest neighbours classifier. Neighbours tied with the k-th nearest are included in the vote.
#[derive(Clone, Debug)]
pub struct IBk {
	pub k: usize,
}

impl Default for IBk {
	fn default() -> Self {
		Self { k: 1 }
	}
}

#[derive(Clone, Debug)]
pub struct IBkModel {
	k: usize,
	distance: EuclideanDistance,
	instances: Instances,
}

impl Learner for IBk {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		Ok(Box::new(IBkModel {
			k: self.k.max(1),
			distance: EuclideanDistance::fit(instances),
			instances: instances.clone(),
		}))
	}
}

impl IBkModel {
	/// The indexes of the nearest neighbours of `example`.
	pub fn neighbours(&self, example: ArrayView1<f32>) -> Vec<usize> {
		let distances = self.distance.distances(&self.instances, example);
		let mut order: Vec<usize> = (0..distances.len()).collect();
		order.sort_by(|a, b| {
			distances[*a]
				.partial_cmp(&distances[*b])
				.unwrap_or(Ordering::Equal)
		});
		let k = self.k.min(order.len());
		if k == 0 {
			return Vec::new();
		}
		let kth_distance = distances[order[k - 1]];
		order
			.into_iter()
			.enumerate()
			.take_while(|(position, index)| *position < k || distances[*index] <= kth_distance)
			.map(|(_, index)| index)
			.collect()
	}
}

impl Model for IBkModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.instances.n_attributes(), example)?;
		let n_examples = self.instances.n_examples();
		// Every class starts with a small count so a distribution is defined even without votes.
		let mut distribution =
			Array1::from_elem(self.instances.n_classes(), 1.0 / n_examples.max(1) as f32);
		for index in self.neighbours(example) {
			distribution[self.instances.labels[index]] += self.instances.weights[index];
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
	fn test_nearest_neighbour_memorizes() {
		let instances = datasets::weather();
		let model = IBk::default().train(&instances, 1).unwrap();
		for (example, label) in instances.features.genrows().into_iter().zip(instances.labels.iter()) {
			assert_eq!(model.predict(example).unwrap(), *label);
		}
	}

	#[test]
	fn test_ties_are_included() {
		let instances = datasets::weather().select_attributes(&[0]);
		let model = IBk::default().train(&instances, 1).unwrap();
		// all five sunny days are at distance 0: three "no" and two "yes"
		let distribution = model.distribution(arr1(&[0.0]).view()).unwrap();
		assert!((distribution[0] - 29.0 / 72.0).abs() < 1e-6);
		assert_eq!(model.predict(arr1(&[0.0]).view()).unwrap(), 1);
	}
}
