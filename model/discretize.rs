/*!
Supervised discretization of number attributes. Each attribute is split recursively at the cut point that minimizes the class entropy, and a split is kept only if its information gain pays for itself under the minimum description length criterion of Fayyad and Irani.
*/

use crate::{
	math::{conditional_entropy, entropy},
	midpoint, Attribute, Instances,
};
use ndarray::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Discretizer {
	/// The attributes after discretization. Every attribute is an enum attribute.
	attributes: Vec<Attribute>,
	/// The sorted cut points of each number attribute. Enum attributes have `None`.
	cut_points: Vec<Option<Vec<f32>>>,
}

impl Discretizer {
	pub fn fit(instances: &Instances) -> Self {
		let n_classes = instances.n_classes();
		let mut attributes = Vec::with_capacity(instances.n_attributes());
		let mut cut_points = Vec::with_capacity(instances.n_attributes());
		for (attribute_index, attribute) in instances.attributes.iter().enumerate() {
			match attribute {
				Attribute::Enum { .. } => {
					attributes.push(attribute.clone());
					cut_points.push(None);
				}
				Attribute::Number { name } => {
					let mut values: Vec<(f32, usize, f64)> = instances
						.features
						.column(attribute_index)
						.iter()
						.zip(instances.labels.iter().zip(instances.weights.iter()))
						.filter(|(value, _)| !value.is_nan())
						.map(|(value, (label, weight))| (*value, *label, *weight as f64))
						.collect();
					values.sort_by(|a, b| {
						a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
					});
					let mut attribute_cut_points = Vec::new();
					find_cut_points(&values, n_classes, &mut attribute_cut_points);
					attributes.push(Attribute::Enum {
						name: name.clone(),
						options: bin_names(&attribute_cut_points),
					});
					cut_points.push(Some(attribute_cut_points));
				}
			}
		}
		Self {
			attributes,
			cut_points,
		}
	}

	pub fn attributes(&self) -> &[Attribute] {
		&self.attributes
	}

	/// The cut points of the attribute at `attribute_index`, or `None` if it was an enum attribute.
	pub fn cut_points(&self, attribute_index: usize) -> Option<&[f32]> {
		self.cut_points
			.get(attribute_index)
			.and_then(|cut_points| cut_points.as_deref())
	}

	/// Map a value of the attribute at `attribute_index` to the index of its bin. Missing values stay missing.
	pub fn transform_value(&self, attribute_index: usize, value: f32) -> f32 {
		match self.cut_points(attribute_index) {
			None => value,
			Some(_) if value.is_nan() => value,
			Some(cut_points) => cut_points
				.iter()
				.position(|cut_point| value <= *cut_point)
				.unwrap_or_else(|| cut_points.len()) as f32,
		}
	}

	pub fn transform_example(&self, example: ArrayView1<f32>) -> Array1<f32> {
		example
			.iter()
			.enumerate()
			.map(|(attribute_index, value)| self.transform_value(attribute_index, *value))
			.collect()
	}

	pub fn transform(&self, instances: &Instances) -> Instances {
		let mut features = instances.features.clone();
		for (attribute_index, mut column) in features.axis_iter_mut(Axis(1)).enumerate() {
			for value in column.iter_mut() {
				*value = self.transform_value(attribute_index, *value);
			}
		}
		Instances {
			attributes: self.attributes.clone(),
			features,
			labels: instances.labels.clone(),
			weights: instances.weights.clone(),
			classes: instances.classes.clone(),
		}
	}
}

/// `values` are (value, label, weight) sorted by value. The cut points are pushed in ascending order.
fn find_cut_points(values: &[(f32, usize, f64)], n_classes: usize, cut_points: &mut Vec<f32>) {
	if values.len() < 2 {
		return;
	}
	let mut prior = vec![0.0; n_classes];
	for (_, label, weight) in values {
		prior[*label] += weight;
	}
	let prior_entropy = entropy(&prior);
	let mut left = vec![0.0; n_classes];
	let mut right = prior.clone();
	let mut best_entropy = prior_entropy;
	let mut best: Option<(usize, f32, [Vec<f64>; 2])> = None;
	let mut n_cut_points = 0;
	for index in 0..values.len() - 1 {
		let (value, label, weight) = values[index];
		left[label] += weight;
		right[label] -= weight;
		let next_value = values[index + 1].0;
		if value < next_value {
			let counts = [left.clone(), right.clone()];
			let split_entropy = conditional_entropy(&counts);
			if split_entropy < best_entropy {
				best_entropy = split_entropy;
				best = Some((index, midpoint(value, next_value), counts));
			}
			n_cut_points += 1;
		}
	}
	let (best_index, cut_point, counts) = match best {
		Some(best) => best,
		None => return,
	};
	if prior_entropy - best_entropy <= 0.0 || !accept_split(&prior, &counts, n_cut_points) {
		return;
	}
	find_cut_points(&values[..=best_index], n_classes, cut_points);
	cut_points.push(cut_point);
	find_cut_points(&values[best_index + 1..], n_classes, cut_points);
}

/// The Fayyad and Irani stopping rule: keep the split only if its gain exceeds the cost of encoding it.
fn accept_split(prior: &[f64], counts: &[Vec<f64>; 2], n_cut_points: usize) -> bool {
	let n: f64 = prior.iter().sum();
	let n_present = |counts: &[f64]| counts.iter().filter(|count| **count > 0.0).count() as f64;
	let k = n_present(prior);
	let k_left = n_present(&counts[0]);
	let k_right = n_present(&counts[1]);
	let prior_entropy = entropy(prior);
	let gain = prior_entropy - conditional_entropy(counts);
	let delta = (3f64.powf(k) - 2.0).log2()
		- (k * prior_entropy - k_left * entropy(&counts[0]) - k_right * entropy(&counts[1]));
	gain > ((n_cut_points as f64).log2() + delta) / n
}

fn bin_names(cut_points: &[f32]) -> Vec<String> {
	if cut_points.is_empty() {
		return vec!["All".to_owned()];
	}
	let mut names = Vec::with_capacity(cut_points.len() + 1);
	names.push(format!("(-inf-{}]", cut_points[0]));
	for window in cut_points.windows(2) {
		names.push(format!("({}-{}]", window[0], window[1]));
	}
	names.push(format!("({}-inf)", cut_points[cut_points.len() - 1]));
	names
}

#[cfg(test)]
fn instances(values: &[f32], labels: &[usize]) -> Instances {
	Instances {
		attributes: vec![Attribute::Number {
			name: "x".to_owned(),
		}],
		features: Array2::from_shape_vec((values.len(), 1), values.to_vec()).unwrap(),
		labels: labels.to_vec(),
		weights: vec![1.0; labels.len()],
		classes: vec!["a".to_owned(), "b".to_owned()],
	}
}

#[test]
fn test_separable() {
	let values: Vec<f32> = (1..=10).map(|x| x as f32).collect();
	let labels = [0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
	let instances = instances(&values, &labels);
	let discretizer = Discretizer::fit(&instances);
	assert_eq!(discretizer.cut_points(0), Some(&[5.5][..]));
	assert_eq!(
		discretizer.attributes()[0],
		Attribute::Enum {
			name: "x".to_owned(),
			options: vec!["(-inf-5.5]".to_owned(), "(5.5-inf)".to_owned()],
		}
	);
	let transformed = discretizer.transform(&instances);
	assert_eq!(transformed.features[(4, 0)], 0.0);
	assert_eq!(transformed.features[(5, 0)], 1.0);
	assert!(discretizer.transform_value(0, std::f32::NAN).is_nan());
}

#[test]
fn test_noise_is_not_split() {
	let instances = instances(&[1.0, 2.0, 3.0, 4.0], &[0, 1, 0, 1]);
	let discretizer = Discretizer::fit(&instances);
	assert_eq!(discretizer.cut_points(0), Some(&[][..]));
	assert_eq!(
		discretizer.attributes()[0],
		Attribute::Enum {
			name: "x".to_owned(),
			options: vec!["All".to_owned()],
		}
	);
	assert_eq!(discretizer.transform_value(0, 100.0), 0.0);
}
