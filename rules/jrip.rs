use crate::{
	part::class_counts,
	rule::{to_distribution, Condition, Rule, RuleList},
};
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use suinz_model::{enum_index, midpoint, Attribute, Instances, Learner, Model, TrainError};

/**
JRip learns a decision list with the RIPPER procedure. Classes are handled from the least to the most frequent. For each class, rules are grown on part of the uncovered examples by adding the condition with the highest FOIL gain until no negatives are covered, then pruned on the rest by keeping the prefix of conditions with the best (p - n) / (p + n). Rules stop being added for a class once a pruned rule is less precise than `min_precision`. The most frequent class is the default.
*/
#[derive(Clone, Debug)]
pub struct JRip {
	/// One of this many folds is held out for pruning.
	pub folds: usize,
	/// The minimum weight a rule must cover on the growing set.
	pub min_coverage: f64,
	pub min_precision: f64,
}

impl Default for JRip {
	fn default() -> Self {
		Self {
			folds: 3,
			min_coverage: 2.0,
			min_precision: 0.5,
		}
	}
}

/// The weight of the positive and negative examples covered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Coverage {
	positive: f64,
	negative: f64,
}

impl Coverage {
	fn total(&self) -> f64 {
		self.positive + self.negative
	}

	fn precision(&self) -> f64 {
		if self.total() > 0.0 {
			self.positive / self.total()
		} else {
			0.0
		}
	}

	fn worth(&self) -> f64 {
		if self.total() > 0.0 {
			(self.positive - self.negative) / self.total()
		} else {
			0.0
		}
	}
}

fn coverage(
	instances: &Instances,
	indexes: &[usize],
	conditions: &[Condition],
	class: usize,
) -> Coverage {
	let mut coverage = Coverage::default();
	for index in indexes {
		let example = instances.features.row(*index);
		if conditions.iter().all(|condition| condition.matches(example)) {
			let weight = instances.weights[*index] as f64;
			if instances.labels[*index] == class {
				coverage.positive += weight;
			} else {
				coverage.negative += weight;
			}
		}
	}
	coverage
}

fn foil_gain(before: Coverage, after: Coverage) -> f64 {
	if after.positive <= 0.0 || before.positive <= 0.0 {
		return 0.0;
	}
	after.positive * (after.precision().log2() - before.precision().log2())
}

impl Learner for JRip {
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let mut rng = suinz_model::rng(seed);
		let class_weights = instances.class_weights();
		let mut class_order: Vec<usize> = (0..instances.n_classes()).collect();
		class_order.sort_by(|a, b| {
			class_weights[*a]
				.partial_cmp(&class_weights[*b])
				.unwrap_or(Ordering::Equal)
		});
		let mut remaining: Vec<usize> = (0..instances.n_examples())
			.filter(|index| instances.weights[*index] > 0.0)
			.collect();
		let mut rules = Vec::new();
		let n_ordered = class_order.len().saturating_sub(1);
		for class in class_order.iter().take(n_ordered).cloned() {
			loop {
				let positives = coverage(instances, &remaining, &[], class).positive;
				if positives <= 0.0 {
					break;
				}
				let mut shuffled = remaining.clone();
				shuffled.shuffle(&mut rng);
				let folds = self.folds.max(2);
				let prune_set: Vec<usize> = shuffled.iter().step_by(folds).cloned().collect();
				let grow_set: Vec<usize> = shuffled
					.iter()
					.enumerate()
					.filter(|(position, _)| position % folds != 0)
					.map(|(_, index)| *index)
					.collect();
				let conditions = self.grow_rule(instances, &grow_set, class);
				if conditions.is_empty() {
					break;
				}
				let conditions = prune_rule(instances, &prune_set, conditions, class);
				let pruned = coverage(instances, &prune_set, &conditions, class);
				let precision = if pruned.total() > 0.0 {
					pruned.precision()
				} else {
					coverage(instances, &grow_set, &conditions, class).precision()
				};
				if precision < self.min_precision {
					break;
				}
				let (covered, uncovered): (Vec<usize>, Vec<usize>) =
					remaining.iter().partition(|index| {
						let example = instances.features.row(**index);
						conditions.iter().all(|condition| condition.matches(example))
					});
				if coverage(instances, &covered, &[], class).positive <= 0.0 {
					break;
				}
				rules.push(Rule {
					conditions,
					distribution: to_distribution(&class_counts(instances, &covered)),
				});
				remaining = uncovered;
			}
		}
		let remaining_counts = class_counts(instances, &remaining);
		let default = if remaining_counts.iter().sum::<f64>() > 0.0 {
			to_distribution(&remaining_counts)
		} else {
			to_distribution(&class_weights)
		};
		Ok(Box::new(RuleList {
			rules,
			default,
			n_attributes: instances.n_attributes(),
		}))
	}
}

impl JRip {
	/// Add conditions greedily by FOIL gain until the rule covers no negatives or no condition helps.
	fn grow_rule(&self, instances: &Instances, grow_set: &[usize], class: usize) -> Vec<Condition> {
		let mut conditions: Vec<Condition> = Vec::new();
		let mut covered: Vec<usize> = grow_set.to_vec();
		loop {
			let before = coverage(instances, &covered, &[], class);
			if before.negative <= 0.0 || before.positive <= 0.0 {
				break;
			}
			let mut best: Option<(f64, Condition)> = None;
			for (attribute_index, attribute) in instances.attributes.iter().enumerate() {
				let candidates = match attribute {
					Attribute::Enum { options, .. } => {
						if conditions
							.iter()
							.any(|condition| condition.attribute_index() == attribute_index)
						{
							continue;
						}
						enum_candidates(instances, &covered, attribute_index, options.len(), class)
					}
					Attribute::Number { .. } => {
						number_candidates(instances, &covered, attribute_index, class)
					}
				};
				for (condition, after) in candidates {
					if after.total() < self.min_coverage {
						continue;
					}
					let gain = foil_gain(before, after);
					if gain > best.as_ref().map(|(gain, _)| *gain).unwrap_or(0.0) {
						best = Some((gain, condition));
					}
				}
			}
			match best {
				Some((_, condition)) => {
					covered.retain(|index| condition.matches(instances.features.row(*index)));
					conditions.push(condition);
				}
				None => break,
			}
		}
		conditions
	}
}

fn enum_candidates(
	instances: &Instances,
	covered: &[usize],
	attribute_index: usize,
	n_options: usize,
	class: usize,
) -> Vec<(Condition, Coverage)> {
	let mut coverages = vec![Coverage::default(); n_options];
	for index in covered {
		let value = instances.features[[*index, attribute_index]];
		if let Some(option) = enum_index(value, n_options) {
			let weight = instances.weights[*index] as f64;
			if instances.labels[*index] == class {
				coverages[option].positive += weight;
			} else {
				coverages[option].negative += weight;
			}
		}
	}
	coverages
		.into_iter()
		.enumerate()
		.map(|(option, coverage)| {
			(
				Condition::Equals {
					attribute_index,
					option,
				},
				coverage,
			)
		})
		.collect()
}

/// Every threshold halfway between two consecutive distinct values, tested in both directions.
fn number_candidates(
	instances: &Instances,
	covered: &[usize],
	attribute_index: usize,
	class: usize,
) -> Vec<(Condition, Coverage)> {
	let mut values: Vec<(f32, bool, f64)> = covered
		.iter()
		.map(|index| {
			(
				instances.features[[*index, attribute_index]],
				instances.labels[*index] == class,
				instances.weights[*index] as f64,
			)
		})
		.filter(|(value, _, _)| !value.is_nan())
		.collect();
	values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
	let mut total = Coverage::default();
	for (_, is_positive, weight) in values.iter() {
		if *is_positive {
			total.positive += weight;
		} else {
			total.negative += weight;
		}
	}
	let mut candidates = Vec::new();
	let mut below = Coverage::default();
	for (position, (value, is_positive, weight)) in values.iter().enumerate() {
		if *is_positive {
			below.positive += weight;
		} else {
			below.negative += weight;
		}
		let next = match values.get(position + 1) {
			Some((next, _, _)) if next > value => *next,
			_ => continue,
		};
		let threshold = midpoint(*value, next);
		let above = Coverage {
			positive: total.positive - below.positive,
			negative: total.negative - below.negative,
		};
		candidates.push((
			Condition::LessOrEqual {
				attribute_index,
				value: threshold,
			},
			below,
		));
		candidates.push((
			Condition::Greater {
				attribute_index,
				value: threshold,
			},
			above,
		));
	}
	candidates
}

/// Keep the prefix of `conditions` whose coverage of `prune_set` is worth the most. Ties go to the shorter prefix.
fn prune_rule(
	instances: &Instances,
	prune_set: &[usize],
	mut conditions: Vec<Condition>,
	class: usize,
) -> Vec<Condition> {
	if prune_set.is_empty() {
		return conditions;
	}
	let mut best_length = conditions.len();
	let mut best_worth = std::f64::NEG_INFINITY;
	for length in 1..=conditions.len() {
		let worth = coverage(instances, prune_set, &conditions[..length], class).worth();
		if worth > best_worth {
			best_worth = worth;
			best_length = length;
		}
	}
	conditions.truncate(best_length);
	conditions
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_foil_gain() {
		let before = Coverage {
			positive: 4.0,
			negative: 4.0,
		};
		let after = Coverage {
			positive: 3.0,
			negative: 0.0,
		};
		assert!((foil_gain(before, after) - 3.0).abs() < 1e-10);
		assert_eq!(foil_gain(before, Coverage::default()), 0.0);
	}

	#[test]
	fn test_number_candidates() {
		let instances = datasets::blobs();
		let covered: Vec<usize> = (0..instances.n_examples()).collect();
		let candidates = number_candidates(&instances, &covered, 0, 0);
		// the threshold between the first and second class covers exactly the first class
		let (_, coverage) = candidates
			.iter()
			.find(|(condition, _)| {
				matches!(condition, Condition::LessOrEqual { value, .. } if *value > 0.9 && *value < 2.0)
			})
			.unwrap();
		assert_eq!(*coverage, Coverage {
			positive: 20.0,
			negative: 0.0
		});
	}

	#[test]
	fn test_prune_keeps_best_prefix() {
		let instances = datasets::weather();
		let prune_set: Vec<usize> = (0..instances.n_examples()).collect();
		// outlook = overcast is pure and the second condition only loses coverage
		let conditions = vec![
			Condition::Equals {
				attribute_index: 0,
				option: 1,
			},
			Condition::Equals {
				attribute_index: 3,
				option: 1,
			},
		];
		let pruned = prune_rule(&instances, &prune_set, conditions, 0);
		assert_eq!(pruned.len(), 1);
	}

	#[test]
	fn test_deterministic() {
		let instances = datasets::blobs();
		let a = JRip::default().train(&instances, 3).unwrap();
		let b = JRip::default().train(&instances, 3).unwrap();
		for example in instances.features.genrows() {
			assert_eq!(a.distribution(example).unwrap(), b.distribution(example).unwrap());
		}
	}
}
