use ndarray::prelude::*;
use std::cmp::Ordering;
use suinz_model::{
	check_example, enum_index, midpoint, Attribute, Instances, Learner, Model, PredictError, TrainError,
};

/// OneR builds one rule per attribute, mapping each value of the attribute to a class, and keeps the rule that classifies the most training weight correctly. Number attributes are split into buckets that each hold at least `min_bucket_size` examples of their majority class.
#[derive(Clone, Debug)]
pub struct OneR {
	pub min_bucket_size: f64,
}

impl Default for OneR {
	fn default() -> Self {
		Self {
			min_bucket_size: 6.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum OneRRule {
	/// The class of each option.
	Enum { classes: Vec<usize> },
	/// Values up to and including `breakpoints[i]` get `classes[i]`. The last class has no breakpoint.
	Number {
		breakpoints: Vec<f32>,
		classes: Vec<usize>,
	},
}

#[derive(Clone, Debug)]
pub struct OneRModel {
	pub attribute_index: usize,
	pub rule: OneRRule,
	/// The class of examples whose value is missing.
	pub missing_class: usize,
	n_attributes: usize,
	n_classes: usize,
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

impl Learner for OneR {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let majority_class = instances.majority_class();
		let mut best: Option<(f64, OneRModel)> = None;
		for (attribute_index, attribute) in instances.attributes.iter().enumerate() {
			let (correct, rule, missing_class) = match attribute {
				Attribute::Enum { options, .. } => {
					enum_rule(instances, attribute_index, options.len(), majority_class)
				}
				Attribute::Number { .. } => {
					self.number_rule(instances, attribute_index, majority_class)
				}
			};
			if best.as_ref().map(|best| correct > best.0).unwrap_or(true) {
				best = Some((
					correct,
					OneRModel {
						attribute_index,
						rule,
						missing_class,
						n_attributes: instances.n_attributes(),
						n_classes: instances.n_classes(),
					},
				));
			}
		}
		let model = match best {
			Some((_, model)) => model,
			None => OneRModel {
				attribute_index: 0,
				rule: OneRRule::Enum {
					classes: Vec::new(),
				},
				missing_class: majority_class,
				n_attributes: 0,
				n_classes: instances.n_classes(),
			},
		};
		Ok(Box::new(model))
	}
}

/// The weighted class counts of the examples whose value is missing.
fn missing_counts(instances: &Instances, attribute_index: usize) -> Vec<f64> {
	let mut counts = vec![0.0; instances.n_classes()];
	for ((value, label), weight) in instances
		.features
		.column(attribute_index)
		.iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		if value.is_nan() {
			counts[*label] += *weight as f64;
		}
	}
	counts
}

fn missing_rule(counts: &[f64], majority_class: usize) -> (f64, usize) {
	if counts.iter().sum::<f64>() > 0.0 {
		let class = max_index(counts);
		(counts[class], class)
	} else {
		(0.0, majority_class)
	}
}

fn enum_rule(
	instances: &Instances,
	attribute_index: usize,
	n_options: usize,
	majority_class: usize,
) -> (f64, OneRRule, usize) {
	let mut counts = vec![vec![0.0; instances.n_classes()]; n_options];
	for ((value, label), weight) in instances
		.features
		.column(attribute_index)
		.iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		if let Some(option) = enum_index(*value, n_options) {
			counts[option][*label] += *weight as f64;
		}
	}
	let mut correct = 0.0;
	let classes = counts
		.iter()
		.map(|counts| {
			if counts.iter().sum::<f64>() > 0.0 {
				let class = max_index(counts);
				correct += counts[class];
				class
			} else {
				majority_class
			}
		})
		.collect();
	let (missing_correct, missing_class) =
		missing_rule(&missing_counts(instances, attribute_index), majority_class);
	(
		correct + missing_correct,
		OneRRule::Enum { classes },
		missing_class,
	)
}

impl OneR {
	fn number_rule(
		&self,
		instances: &Instances,
		attribute_index: usize,
		majority_class: usize,
	) -> (f64, OneRRule, usize) {
		let n_classes = instances.n_classes();
		let mut known: Vec<(f32, usize, f64)> = instances
			.features
			.column(attribute_index)
			.iter()
			.zip(instances.labels.iter())
			.zip(instances.weights.iter())
			.filter(|((value, _), _)| !value.is_nan())
			.map(|((value, label), weight)| (*value, *label, *weight as f64))
			.collect();
		known.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
		let mut breakpoints = Vec::new();
		let mut classes: Vec<usize> = Vec::new();
		let mut correct = 0.0;
		let mut index = 0;
		while index < known.len() {
			let mut counts = vec![0.0; n_classes];
			// Fill the bucket until its majority class has enough examples.
			loop {
				let (_, label, weight) = known[index];
				counts[label] += weight;
				index += 1;
				if counts[max_index(&counts)] >= self.min_bucket_size || index >= known.len() {
					break;
				}
			}
			// Extend it with the following examples of its majority class.
			while index < known.len() && known[index].1 == max_index(&counts) {
				counts[known[index].1] += known[index].2;
				index += 1;
			}
			// Never separate equal values.
			while index < known.len() && known[index].0 == known[index - 1].0 {
				counts[known[index].1] += known[index].2;
				index += 1;
			}
			let class = max_index(&counts);
			correct += counts[class];
			if index < known.len() {
				let breakpoint = midpoint(known[index - 1].0, known[index].0);
				// Adjacent buckets with the same class are merged.
				if classes.last() == Some(&class) {
					if let Some(last) = breakpoints.last_mut() {
						*last = breakpoint;
					}
				} else {
					breakpoints.push(breakpoint);
					classes.push(class);
				}
			} else if classes.last() == Some(&class) {
				breakpoints.pop();
			} else {
				classes.push(class);
			}
		}
		if classes.is_empty() {
			classes.push(majority_class);
		}
		let (missing_correct, missing_class) =
			missing_rule(&missing_counts(instances, attribute_index), majority_class);
		(
			correct + missing_correct,
			OneRRule::Number {
				breakpoints,
				classes,
			},
			missing_class,
		)
	}
}

impl OneRModel {
	fn class(&self, example: ArrayView1<f32>) -> usize {
		let value = example
			.get(self.attribute_index)
			.cloned()
			.unwrap_or(std::f32::NAN);
		if value.is_nan() {
			return self.missing_class;
		}
		match &self.rule {
			OneRRule::Enum { classes } => enum_index(value, classes.len())
				.map(|option| classes[option])
				.unwrap_or(self.missing_class),
			OneRRule::Number {
				breakpoints,
				classes,
			} => {
				let bucket = breakpoints
					.iter()
					.position(|breakpoint| value <= *breakpoint)
					.unwrap_or_else(|| breakpoints.len());
				classes
					.get(bucket)
					.cloned()
					.unwrap_or(self.missing_class)
			}
		}
	}
}

impl Model for OneRModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		let mut distribution = Array1::zeros(self.n_classes);
		if let Some(probability) = distribution.get_mut(self.class(example)) {
			*probability = 1.0;
		}
		Ok(distribution)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_weather_picks_outlook() {
		let instances = datasets::weather();
		let (correct, rule, _) = enum_rule(&instances, 0, 3, 0);
		assert_eq!(correct, 10.0);
		assert_eq!(rule, OneRRule::Enum {
			classes: vec![1, 0, 0]
		});
	}

	#[test]
	fn test_buckets() {
		let instances = datasets::blobs();
		let (correct, rule, _) = OneR::default().number_rule(&instances, 0, 0);
		assert_eq!(correct, 60.0);
		match rule {
			OneRRule::Number {
				breakpoints,
				classes,
			} => {
				assert_eq!(classes, vec![0, 1, 2]);
				assert_eq!(breakpoints.len(), 2);
				assert!(breakpoints[0] > 0.9 && breakpoints[0] < 2.0);
			}
			_ => panic!("expected a number rule"),
		}
	}
}
