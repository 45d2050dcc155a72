use crate::node::{BranchSplit, BranchSplitContinuous, BranchSplitDiscrete};
use std::cmp::Ordering;
use suinz_model::{
	enum_index,
	math::{conditional_entropy, entropy, split_entropy},
	midpoint,
	Attribute, Instances,
};

/// The examples at a node, as (index into the instances, weight). Examples with a missing value for a split's attribute go down every branch with a fraction of their weight.
pub type Items = Vec<(usize, f64)>;

/// A candidate split of the examples at a node on one attribute.
#[derive(Clone, Debug)]
pub struct Candidate {
	pub split: BranchSplit,
	/// The class counts of the examples with a known value in each branch.
	pub counts: Vec<Vec<f64>>,
	/// The weight of the examples whose value is missing.
	pub missing_weight: f64,
	/// The information gain, scaled by the fraction of the weight with a known value.
	pub gain: f64,
	pub gain_ratio: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct SplitOptions {
	/// A split is only valid if at least two branches receive at least this much weight.
	pub min_leaf_weight: f64,
	/// Apply the C4.5 adjustments for number attributes. The minimum branch weight grows with the number of examples, and the gain is penalized by the log of the number of thresholds tried.
	pub c45: bool,
}

pub fn class_counts(instances: &Instances, items: &[(usize, f64)]) -> Vec<f64> {
	let mut class_counts = vec![0.0; instances.n_classes()];
	for (index, weight) in items {
		class_counts[instances.labels[*index]] += weight;
	}
	class_counts
}

/// Whether every example with weight belongs to the same class.
pub fn is_pure(class_counts: &[f64]) -> bool {
	class_counts.iter().filter(|count| **count > 0.0).count() <= 1
}

pub fn evaluate_attribute(
	instances: &Instances,
	items: &[(usize, f64)],
	attribute_index: usize,
	options: SplitOptions,
) -> Option<Candidate> {
	match &instances.attributes[attribute_index] {
		Attribute::Enum { options: values, .. } => {
			evaluate_discrete(instances, items, attribute_index, values.len(), options)
		}
		Attribute::Number { .. } => evaluate_continuous(instances, items, attribute_index, options),
	}
}

fn evaluate_discrete(
	instances: &Instances,
	items: &[(usize, f64)],
	attribute_index: usize,
	n_options: usize,
	options: SplitOptions,
) -> Option<Candidate> {
	let n_classes = instances.n_classes();
	let mut counts = vec![vec![0.0; n_classes]; n_options];
	let mut missing_weight = 0.0;
	for (index, weight) in items {
		let value = instances.features[(*index, attribute_index)];
		match enum_index(value, n_options) {
			Some(option) => counts[option][instances.labels[*index]] += weight,
			None => missing_weight += weight,
		}
	}
	let n_large_branches = counts
		.iter()
		.filter(|counts| counts.iter().sum::<f64>() >= options.min_leaf_weight)
		.count();
	if n_large_branches < 2 {
		return None;
	}
	let (gain, gain_ratio) = score(&counts, missing_weight);
	Some(Candidate {
		split: BranchSplit::Discrete(BranchSplitDiscrete {
			attribute_index,
			n_options,
		}),
		counts,
		missing_weight,
		gain,
		gain_ratio,
	})
}

fn evaluate_continuous(
	instances: &Instances,
	items: &[(usize, f64)],
	attribute_index: usize,
	options: SplitOptions,
) -> Option<Candidate> {
	let n_classes = instances.n_classes();
	let mut known: Vec<(f32, usize, f64)> = items
		.iter()
		.map(|(index, weight)| {
			(
				instances.features[(*index, attribute_index)],
				instances.labels[*index],
				*weight,
			)
		})
		.filter(|(value, _, _)| !value.is_nan())
		.collect();
	if known.len() < 2 {
		return None;
	}
	known.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
	let total_weight: f64 = items.iter().map(|(_, weight)| weight).sum();
	let known_weight: f64 = known.iter().map(|(_, _, weight)| weight).sum();
	let missing_weight = total_weight - known_weight;
	let min_split = if options.c45 {
		(0.1 * known_weight / n_classes as f64)
			.max(options.min_leaf_weight)
			.min(25.0)
	} else {
		options.min_leaf_weight
	};
	if known_weight < 2.0 * min_split {
		return None;
	}
	let mut left = vec![0.0; n_classes];
	let mut right = vec![0.0; n_classes];
	for (_, label, weight) in known.iter() {
		right[*label] += weight;
	}
	let prior_entropy = entropy(&right);
	let mut left_weight = 0.0;
	let mut n_thresholds = 0;
	let mut best: Option<(f64, f32, Vec<Vec<f64>>)> = None;
	for index in 0..known.len() - 1 {
		let (value, label, weight) = known[index];
		left[label] += weight;
		right[label] -= weight;
		left_weight += weight;
		let next_value = known[index + 1].0;
		if value >= next_value {
			continue;
		}
		if left_weight < min_split || known_weight - left_weight < min_split {
			continue;
		}
		n_thresholds += 1;
		let counts = vec![left.clone(), right.clone()];
		let gain = prior_entropy - conditional_entropy(&counts);
		if best.as_ref().map(|(best_gain, _, _)| gain > *best_gain).unwrap_or(true) {
			best = Some((gain, midpoint(value, next_value), counts));
		}
	}
	let (_, split_value, counts) = best?;
	let (mut gain, _) = score(&counts, missing_weight);
	if options.c45 && total_weight > 0.0 {
		gain -= (n_thresholds as f64).log2() / total_weight;
	}
	let gain_ratio = ratio_of(gain, &counts, missing_weight);
	Some(Candidate {
		split: BranchSplit::Continuous(BranchSplitContinuous {
			attribute_index,
			split_value,
		}),
		counts,
		missing_weight,
		gain,
		gain_ratio,
	})
}

/// The information gain of a split, scaled by the known fraction of the weight, and the gain ratio.
fn score(counts: &[Vec<f64>], missing_weight: f64) -> (f64, f64) {
	let mut totals = vec![0.0; counts.first().map(|counts| counts.len()).unwrap_or(0)];
	for branch in counts {
		for (total, count) in totals.iter_mut().zip(branch.iter()) {
			*total += count;
		}
	}
	let known_weight: f64 = totals.iter().sum();
	let total_weight = known_weight + missing_weight;
	if total_weight <= 0.0 {
		return (0.0, 0.0);
	}
	let gain = (known_weight / total_weight) * (entropy(&totals) - conditional_entropy(counts));
	(gain, ratio_of(gain, counts, missing_weight))
}

/// The gain divided by the split information, where examples with a missing value count as their own branch.
fn ratio_of(gain: f64, counts: &[Vec<f64>], missing_weight: f64) -> f64 {
	let mut branches: Vec<Vec<f64>> = counts.to_vec();
	branches.push(vec![missing_weight]);
	let split_information = split_entropy(&branches);
	if split_information > 1e-10 {
		gain / split_information
	} else {
		0.0
	}
}

/// Send the items at a node down the branches of `split`. Items with a missing value go down every branch with weight scaled by `branch_weights`.
pub fn partition(
	instances: &Instances,
	items: &[(usize, f64)],
	split: &BranchSplit,
	branch_weights: &[f64],
) -> Vec<Items> {
	let mut parts = vec![Vec::new(); branch_weights.len()];
	for (index, weight) in items {
		let example = instances.features.row(*index);
		match split.child_index(example) {
			Some(child_index) if child_index < parts.len() => {
				parts[child_index].push((*index, *weight))
			}
			_ => {
				for (part, branch_weight) in parts.iter_mut().zip(branch_weights.iter()) {
					if *branch_weight > 0.0 {
						part.push((*index, weight * branch_weight));
					}
				}
			}
		}
	}
	parts
}

/// The fraction of the known weight in each branch of a candidate.
pub fn branch_weights(counts: &[Vec<f64>]) -> Vec<f64> {
	let totals: Vec<f64> = counts.iter().map(|counts| counts.iter().sum()).collect();
	let known_weight: f64 = totals.iter().sum();
	if known_weight > 0.0 {
		totals.iter().map(|total| total / known_weight).collect()
	} else {
		vec![1.0 / totals.len().max(1) as f64; totals.len()]
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	fn all(instances: &Instances) -> Items {
		(0..instances.n_examples()).map(|index| (index, 1.0)).collect()
	}

	#[test]
	fn test_outlook_split() {
		let instances = datasets::weather();
		let candidate = evaluate_attribute(
			&instances,
			&all(&instances),
			0,
			SplitOptions {
				min_leaf_weight: 2.0,
				c45: true,
			},
		)
		.unwrap();
		assert_eq!(
			candidate.counts,
			vec![vec![2.0, 3.0], vec![4.0, 0.0], vec![3.0, 2.0]]
		);
		// the textbook gain of outlook on the weather data is 0.247 bits
		assert!((candidate.gain - 0.2467).abs() < 1e-3);
		assert!((candidate.gain_ratio - 0.1564).abs() < 1e-3);
	}

	#[test]
	fn test_continuous_split() {
		let instances = datasets::blobs();
		let candidate = evaluate_attribute(
			&instances,
			&all(&instances),
			0,
			SplitOptions {
				min_leaf_weight: 2.0,
				c45: false,
			},
		)
		.unwrap();
		match candidate.split {
			BranchSplit::Continuous(split) => {
				let value = split.split_value;
				assert!((value > 0.9 && value < 2.0) || (value > 2.9 && value < 4.0));
			}
			_ => panic!("expected a continuous split"),
		}
		let weights = branch_weights(&candidate.counts);
		assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
	}

	#[test]
	fn test_partition_with_missing() {
		let mut instances = datasets::weather();
		instances.features[(0, 0)] = std::f32::NAN;
		let split = BranchSplit::Discrete(BranchSplitDiscrete {
			attribute_index: 0,
			n_options: 3,
		});
		let parts = partition(&instances, &all(&instances), &split, &[0.5, 0.25, 0.25]);
		assert_eq!(parts[0].len(), 5);
		assert!(parts[1].contains(&(0, 0.25)));
		let total: f64 = parts.iter().flatten().map(|(_, weight)| weight).sum();
		assert!((total - 14.0).abs() < 1e-9);
	}
}
