use crate::rule::to_distribution;
use ndarray::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use suinz_model::{
	check_example, discretize::Discretizer, enum_index, Attribute, Instances, Learner, Model,
	PredictError, TrainError,
};

/**
A DecisionTable classifies an example by looking up the training examples that agree with it on a subset of the attributes. Number attributes are discretized first. The subset is chosen by a best-first forward search scored by the leave-one-out accuracy of the table, which gives up after `stale_limit` expansions without improvement. Examples whose key is not in the table get the class distribution of the training data.
*/
#[derive(Clone, Debug)]
pub struct DecisionTable {
	pub stale_limit: usize,
}

impl Default for DecisionTable {
	fn default() -> Self {
		Self { stale_limit: 5 }
	}
}

type Key = Vec<Option<usize>>;

#[derive(Clone, Debug)]
pub struct DecisionTableModel {
	pub discretizer: Discretizer,
	/// The attributes that make up the key, in ascending order.
	pub attribute_indexes: Vec<usize>,
	pub table: BTreeMap<Key, Array1<f32>>,
	pub default: Array1<f32>,
	n_attributes: usize,
}

fn key(attributes: &[Attribute], attribute_indexes: &[usize], example: ArrayView1<f32>) -> Key {
	attribute_indexes
		.iter()
		.map(|attribute_index| {
			let n_options = attributes[*attribute_index].n_options().unwrap_or(0);
			enum_index(example[*attribute_index], n_options)
		})
		.collect()
}

fn class_counts_by_key(instances: &Instances, attribute_indexes: &[usize]) -> BTreeMap<Key, Vec<f64>> {
	let mut table: BTreeMap<Key, Vec<f64>> = BTreeMap::new();
	for ((example, label), weight) in instances
		.features
		.genrows()
		.into_iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		let counts = table
			.entry(key(&instances.attributes, attribute_indexes, example))
			.or_insert_with(|| vec![0.0; instances.n_classes()]);
		counts[*label] += *weight as f64;
	}
	table
}

fn max_index(counts: &[f64]) -> usize {
	let mut best = 0;
	for (index, count) in counts.iter().enumerate() {
		if *count > counts[best] {
			best = index;
		}
	}
	best
}

/// The weighted fraction of the examples the table keyed by `attribute_indexes` classifies correctly when each example is left out of its own cell.
fn leave_one_out_accuracy(instances: &Instances, attribute_indexes: &[usize]) -> f64 {
	let table = class_counts_by_key(instances, attribute_indexes);
	let class_weights = instances.class_weights();
	let total_weight: f64 = class_weights.iter().sum();
	if total_weight <= 0.0 {
		return 0.0;
	}
	let mut correct = 0.0;
	let mut counts = vec![0.0; instances.n_classes()];
	let mut fallback = class_weights.clone();
	for ((example, label), weight) in instances
		.features
		.genrows()
		.into_iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		let weight = *weight as f64;
		let key = key(&instances.attributes, attribute_indexes, example);
		let prediction = match table.get(&key) {
			Some(cell) if cell.iter().sum::<f64>() - weight > 1e-10 => {
				counts.copy_from_slice(cell);
				counts[*label] -= weight;
				max_index(&counts)
			}
			_ => {
				fallback[*label] -= weight;
				let prediction = max_index(&fallback);
				fallback[*label] += weight;
				prediction
			}
		};
		if prediction == *label {
			correct += weight;
		}
	}
	correct / total_weight
}

impl DecisionTable {
	/// Search for the attribute subset with the best leave-one-out accuracy.
	fn select_attributes(&self, instances: &Instances) -> Vec<usize> {
		let mut open: Vec<(f64, Vec<usize>)> = Vec::new();
		let mut closed: BTreeSet<Vec<usize>> = BTreeSet::new();
		let empty = Vec::new();
		let mut best = (leave_one_out_accuracy(instances, &empty), empty.clone());
		open.push(best.clone());
		closed.insert(empty);
		let mut n_stale = 0;
		while n_stale < self.stale_limit {
			// Expand the open subset with the best score, preferring the earliest on ties.
			let mut position = match open.first() {
				Some(_) => 0,
				None => break,
			};
			for (index, (score, _)) in open.iter().enumerate() {
				if *score > open[position].0 {
					position = index;
				}
			}
			let (_, subset) = open.remove(position);
			let mut improved = false;
			for attribute_index in 0..instances.n_attributes() {
				if subset.contains(&attribute_index) {
					continue;
				}
				let mut child = subset.clone();
				child.push(attribute_index);
				child.sort_unstable();
				if !closed.insert(child.clone()) {
					continue;
				}
				let score = leave_one_out_accuracy(instances, &child);
				if score > best.0 + 1e-5 {
					best = (score, child.clone());
					improved = true;
				}
				open.push((score, child));
			}
			if improved {
				n_stale = 0;
			} else {
				n_stale += 1;
			}
		}
		best.1
	}
}

impl Learner for DecisionTable {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let discretizer = Discretizer::fit(instances);
		let discretized = discretizer.transform(instances);
		let attribute_indexes = self.select_attributes(&discretized);
		let table = class_counts_by_key(&discretized, &attribute_indexes)
			.into_iter()
			.map(|(key, counts)| (key, to_distribution(&counts)))
			.collect();
		Ok(Box::new(DecisionTableModel {
			discretizer,
			attribute_indexes,
			table,
			default: to_distribution(&instances.class_weights()),
			n_attributes: instances.n_attributes(),
		}))
	}
}

impl Model for DecisionTableModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		let example = self.discretizer.transform_example(example);
		let key = key(
			self.discretizer.attributes(),
			&self.attribute_indexes,
			example.view(),
		);
		Ok(self.table.get(&key).unwrap_or(&self.default).clone())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_leave_one_out() {
		let instances = datasets::weather();
		// with no attributes every example is predicted as the majority of the other 13
		assert!((leave_one_out_accuracy(&instances, &[]) - 9.0 / 14.0).abs() < 1e-10);
	}

	#[test]
	fn test_selects_separating_attribute() {
		let instances = datasets::blobs();
		let discretized = Discretizer::fit(&instances).transform(&instances);
		let attribute_indexes = DecisionTable::default().select_attributes(&discretized);
		assert!(attribute_indexes.contains(&0));
		assert_eq!(leave_one_out_accuracy(&discretized, &attribute_indexes), 1.0);
	}

	#[test]
	fn test_unmatched_key_uses_default() {
		let instances = datasets::weather();
		let model = DecisionTable::default().train(&instances, 1).unwrap();
		let missing = Array1::from_elem(4, std::f32::NAN);
		let distribution = model.distribution(missing.view()).unwrap();
		assert!(distribution[0] > distribution[1]);
	}
}
