use ndarray::prelude::*;
use suinz_model::{check_example, enum_index, Model, PredictError};

/// A test on the value of one attribute. An example whose value is missing never satisfies a condition.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
	Equals { attribute_index: usize, option: usize },
	LessOrEqual { attribute_index: usize, value: f32 },
	Greater { attribute_index: usize, value: f32 },
}

impl Condition {
	pub fn attribute_index(&self) -> usize {
		match self {
			Condition::Equals {
				attribute_index, ..
			} => *attribute_index,
			Condition::LessOrEqual {
				attribute_index, ..
			} => *attribute_index,
			Condition::Greater {
				attribute_index, ..
			} => *attribute_index,
		}
	}

	pub fn matches(&self, example: ArrayView1<f32>) -> bool {
		let value = match example.get(self.attribute_index()) {
			Some(value) if !value.is_nan() => *value,
			_ => return false,
		};
		match self {
			Condition::Equals { option, .. } => enum_index(value, option + 1) == Some(*option),
			Condition::LessOrEqual { value: threshold, .. } => value <= *threshold,
			Condition::Greater { value: threshold, .. } => value > *threshold,
		}
	}
}

/// A conjunction of conditions and the class distribution of the examples it covers.
#[derive(Clone, Debug)]
pub struct Rule {
	pub conditions: Vec<Condition>,
	pub distribution: Array1<f32>,
}

impl Rule {
	pub fn covers(&self, example: ArrayView1<f32>) -> bool {
		self.conditions
			.iter()
			.all(|condition| condition.matches(example))
	}
}

/// An ordered list of rules. The first rule that covers an example classifies it, and examples no rule covers get the default distribution.
#[derive(Clone, Debug)]
pub struct RuleList {
	pub rules: Vec<Rule>,
	pub default: Array1<f32>,
	pub n_attributes: usize,
}

impl Model for RuleList {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		let distribution = self
			.rules
			.iter()
			.find(|rule| rule.covers(example))
			.map(|rule| &rule.distribution)
			.unwrap_or(&self.default);
		Ok(distribution.clone())
	}
}

/// Turn weighted class counts into a distribution.
pub fn to_distribution(class_counts: &[f64]) -> Array1<f32> {
	let mut distribution: Array1<f32> = class_counts.iter().map(|count| *count as f32).collect();
	suinz_model::normalize(&mut distribution);
	distribution
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_conditions() {
		let example = arr1(&[1.0, 2.5, std::f32::NAN]);
		assert!(Condition::Equals {
			attribute_index: 0,
			option: 1
		}
		.matches(example.view()));
		assert!(!Condition::Equals {
			attribute_index: 0,
			option: 0
		}
		.matches(example.view()));
		assert!(Condition::LessOrEqual {
			attribute_index: 1,
			value: 2.5
		}
		.matches(example.view()));
		assert!(!Condition::Greater {
			attribute_index: 2,
			value: 0.0
		}
		.matches(example.view()));
	}

	#[test]
	fn test_first_covering_rule_wins() {
		let rules = RuleList {
			rules: vec![
				Rule {
					conditions: vec![Condition::Greater {
						attribute_index: 0,
						value: 1.0,
					}],
					distribution: arr1(&[1.0, 0.0]),
				},
				Rule {
					conditions: vec![],
					distribution: arr1(&[0.0, 1.0]),
				},
			],
			default: arr1(&[0.5, 0.5]),
			n_attributes: 1,
		};
		assert_eq!(rules.predict(arr1(&[2.0]).view()).unwrap(), 0);
		assert_eq!(rules.predict(arr1(&[0.0]).view()).unwrap(), 1);
		assert_eq!(rules.predict(arr1(&[std::f32::NAN]).view()).unwrap(), 1);
	}
}
