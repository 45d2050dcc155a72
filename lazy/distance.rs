use ndarray::prelude::*;
use suinz_model::{enum_index, Attribute, Instances};

/**
The Euclidean distance between examples. Number attributes are scaled to [0, 1] by the range seen in training. Enum attributes contribute 0 if the options match and 1 otherwise.

A missing value is as far away as possible. If both values are missing, or an enum value is missing, the difference is 1. If one number value is missing, the difference is the larger of the other value's distances to 0 and 1.
*/
#[derive(Clone, Debug)]
pub struct EuclideanDistance {
	attributes: Vec<Attribute>,
	/// The minimum and maximum of each number attribute. `None` for enum attributes and attributes with no known values.
	ranges: Vec<Option<(f32, f32)>>,
}

impl EuclideanDistance {
	pub fn fit(instances: &Instances) -> Self {
		let ranges = instances
			.attributes
			.iter()
			.zip(instances.features.gencolumns())
			.map(|(attribute, column)| {
				if !attribute.is_number() {
					return None;
				}
				column
					.iter()
					.filter(|value| !value.is_nan())
					.fold(None, |range, value| match range {
						None => Some((*value, *value)),
						Some((min, max)) => Some((f32::min(min, *value), f32::max(max, *value))),
					})
			})
			.collect();
		Self {
			attributes: instances.attributes.clone(),
			ranges,
		}
	}

	fn normalize(&self, attribute_index: usize, value: f32) -> f32 {
		match self.ranges[attribute_index] {
			Some((min, max)) if max > min => (value - min) / (max - min),
			_ => 0.0,
		}
	}

	/// The difference between two values of the attribute at `attribute_index`, between 0 and 1.
	pub fn difference(&self, attribute_index: usize, a: f32, b: f32) -> f32 {
		match &self.attributes[attribute_index] {
			Attribute::Enum { options, .. } => {
				match (enum_index(a, options.len()), enum_index(b, options.len())) {
					(Some(a), Some(b)) if a == b => 0.0,
					_ => 1.0,
				}
			}
			Attribute::Number { .. } => match (a.is_nan(), b.is_nan()) {
				(true, true) => 1.0,
				(false, true) | (true, false) => {
					let known = if a.is_nan() { b } else { a };
					let known = self.normalize(attribute_index, known);
					f32::max(known, 1.0 - known)
				}
				(false, false) => {
					(self.normalize(attribute_index, a) - self.normalize(attribute_index, b)).abs()
				}
			},
		}
	}

	pub fn distance(&self, a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
		a.iter()
			.zip(b.iter())
			.enumerate()
			.map(|(attribute_index, (a, b))| self.difference(attribute_index, *a, *b).powi(2))
			.sum::<f32>()
			.sqrt()
	}

	/// The distance from `example` to every training example.
	pub fn distances(&self, instances: &Instances, example: ArrayView1<f32>) -> Vec<f32> {
		instances
			.features
			.genrows()
			.into_iter()
			.map(|row| self.distance(row, example))
			.collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_distance() {
		let instances = datasets::weather();
		let distance = EuclideanDistance::fit(&instances);
		let a = instances.features.row(0);
		assert_eq!(distance.distance(a, a), 0.0);
		// temperature ranges from 64 to 85
		assert!((distance.difference(1, 64.0, 85.0) - 1.0).abs() < 1e-6);
		assert_eq!(distance.difference(0, 0.0, 2.0), 1.0);
		assert_eq!(distance.difference(0, std::f32::NAN, 2.0), 1.0);
		assert!((distance.difference(1, std::f32::NAN, 70.3) - 0.7).abs() < 1e-5);
		assert_eq!(distance.difference(1, std::f32::NAN, std::f32::NAN), 1.0);
	}
}
