use crate::TrainError;
use ndarray::prelude::*;
use rand::Rng;
use suinz_dataframe::{ColumnView, DataFrameView};

#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
	Number { name: String },
	Enum { name: String, options: Vec<String> },
}

impl Attribute {
	pub fn name(&self) -> &str {
		match self {
			Attribute::Number { name } => name,
			Attribute::Enum { name, .. } => name,
		}
	}

	/// The number of options of an enum attribute, or `None` for a number attribute.
	pub fn n_options(&self) -> Option<usize> {
		match self {
			Attribute::Number { .. } => None,
			Attribute::Enum { options, .. } => Some(options.len()),
		}
	}

	pub fn is_number(&self) -> bool {
		matches!(self, Attribute::Number { .. })
	}
}

/**
`Instances` are the encoded training data handed to a [`Learner`](trait.Learner.html).

Each row of `features` is an example with one value per attribute. Enum values are 0-based option indexes and missing values are NaN. Every example has a known class in `labels` and a weight in `weights`.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct Instances {
	pub attributes: Vec<Attribute>,
	/// (n_examples, n_attributes)
	pub features: Array2<f32>,
	/// (n_examples), 0-indexed into `classes`
	pub labels: Vec<usize>,
	/// (n_examples)
	pub weights: Vec<f32>,
	pub classes: Vec<String>,
}

/// A `Schema` maps the columns of a dataframe to attributes and a class. It encodes the training and the testing part of a dataset the same way.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
	pub attributes: Vec<Attribute>,
	pub classes: Vec<String>,
	pub class_name: String,
	feature_column_indexes: Vec<usize>,
	target_column_index: usize,
}

/// Examples encoded by a `Schema`, including the ones with a missing class.
#[derive(Clone, Debug, PartialEq)]
pub struct Encoded {
	/// (n_examples, n_attributes)
	pub features: Array2<f32>,
	/// (n_examples), `None` where the class is missing
	pub labels: Vec<Option<usize>>,
}

impl Schema {
	pub fn from_dataframe(dataframe: &DataFrameView) -> Result<Self, TrainError> {
		let target_column_index = dataframe.target_column_index;
		let target_column = dataframe
			.columns
			.get(target_column_index)
			.ok_or(TrainError::NoInstances)?;
		let (class_name, classes) = match target_column {
			ColumnView::Enum(column) => (column.name.to_owned(), column.options.to_vec()),
			ColumnView::Number(column) => {
				return Err(TrainError::NumericClass(column.name.to_owned()))
			}
			ColumnView::Text(column) => {
				return Err(TrainError::UnsupportedAttribute(column.name.to_owned()))
			}
			ColumnView::Unknown(column) => {
				return Err(TrainError::NoClasses(column.name.to_owned()))
			}
		};
		if classes.is_empty() {
			return Err(TrainError::NoClasses(class_name));
		}
		let mut attributes = Vec::new();
		let mut feature_column_indexes = Vec::new();
		for (column_index, column) in dataframe.columns.iter().enumerate() {
			if column_index == target_column_index {
				continue;
			}
			let attribute = match column {
				ColumnView::Unknown(column) => Attribute::Number {
					name: column.name.to_owned(),
				},
				ColumnView::Number(column) => Attribute::Number {
					name: column.name.to_owned(),
				},
				ColumnView::Enum(column) => Attribute::Enum {
					name: column.name.to_owned(),
					options: column.options.to_vec(),
				},
				ColumnView::Text(column) => {
					return Err(TrainError::UnsupportedAttribute(column.name.to_owned()))
				}
			};
			attributes.push(attribute);
			feature_column_indexes.push(column_index);
		}
		Ok(Self {
			attributes,
			classes,
			class_name,
			feature_column_indexes,
			target_column_index,
		})
	}

	/// Encode every row of `dataframe`, which must have the columns this schema was built from.
	pub fn encode(&self, dataframe: &DataFrameView) -> Encoded {
		let n_examples = dataframe.nrows();
		let mut features = Array2::from_elem((n_examples, self.attributes.len()), std::f32::NAN);
		for (mut feature_column, column_index) in features
			.axis_iter_mut(Axis(1))
			.zip(self.feature_column_indexes.iter())
		{
			match dataframe.columns.get(*column_index) {
				Some(ColumnView::Number(column)) => {
					for (value, data) in feature_column.iter_mut().zip(column.data.iter()) {
						*value = *data;
					}
				}
				Some(ColumnView::Enum(column)) => {
					for (value, data) in feature_column.iter_mut().zip(column.data.iter()) {
						*value = data
							.map(|data| (data.get() - 1) as f32)
							.unwrap_or(std::f32::NAN);
					}
				}
				_ => {}
			}
		}
		let labels = match dataframe.columns.get(self.target_column_index) {
			Some(ColumnView::Enum(column)) => column
				.data
				.iter()
				.map(|data| {
					data.map(|data| data.get() - 1)
						.filter(|label| *label < self.classes.len())
				})
				.collect(),
			_ => vec![None; n_examples],
		};
		Encoded { features, labels }
	}

	/// Encode the rows of `dataframe` with a known class as unit weight training instances.
	pub fn instances(&self, dataframe: &DataFrameView) -> Instances {
		let encoded = self.encode(dataframe);
		let known: Vec<usize> = encoded
			.labels
			.iter()
			.enumerate()
			.filter_map(|(index, label)| label.map(|_| index))
			.collect();
		let features = encoded.features.select(Axis(0), &known);
		let labels: Vec<usize> = encoded.labels.iter().filter_map(|label| *label).collect();
		let weights = vec![1.0; labels.len()];
		Instances {
			attributes: self.attributes.clone(),
			features,
			labels,
			weights,
			classes: self.classes.clone(),
		}
	}
}

impl Instances {
	pub fn n_examples(&self) -> usize {
		self.labels.len()
	}

	pub fn n_attributes(&self) -> usize {
		self.attributes.len()
	}

	pub fn n_classes(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}

	pub fn total_weight(&self) -> f64 {
		self.weights.iter().map(|weight| *weight as f64).sum()
	}

	/// The sum of the weights of the examples of each class.
	pub fn class_weights(&self) -> Vec<f64> {
		let mut class_weights = vec![0.0; self.n_classes()];
		for (label, weight) in self.labels.iter().zip(self.weights.iter()) {
			class_weights[*label] += *weight as f64;
		}
		class_weights
	}

	/// The class with the most weight, with ties going to the lowest index.
	pub fn majority_class(&self) -> usize {
		let class_weights = self.class_weights();
		let mut best = 0;
		for (class_index, weight) in class_weights.iter().enumerate() {
			if *weight > class_weights[best] {
				best = class_index;
			}
		}
		best
	}

	/// Return an error unless there is at least one example to train on.
	pub fn check_not_empty(&self) -> Result<(), TrainError> {
		if self.is_empty() || self.n_classes() == 0 {
			Err(TrainError::NoInstances)
		} else {
			Ok(())
		}
	}

	/// Copy the examples at `indexes`, in that order.
	pub fn subset(&self, indexes: &[usize]) -> Self {
		Self {
			attributes: self.attributes.clone(),
			features: self.features.select(Axis(0), indexes),
			labels: indexes.iter().map(|index| self.labels[*index]).collect(),
			weights: indexes.iter().map(|index| self.weights[*index]).collect(),
			classes: self.classes.clone(),
		}
	}

	/// Copy these instances with `weights` in place of their weights.
	pub fn with_weights(&self, weights: Vec<f32>) -> Self {
		Self {
			weights,
			..self.clone()
		}
	}

	/// Keep only the attributes at `attribute_indexes`.
	pub fn select_attributes(&self, attribute_indexes: &[usize]) -> Self {
		Self {
			attributes: attribute_indexes
				.iter()
				.map(|index| self.attributes[*index].clone())
				.collect(),
			features: self.features.select(Axis(1), attribute_indexes),
			labels: self.labels.clone(),
			weights: self.weights.clone(),
			classes: self.classes.clone(),
		}
	}

	/// Draw `n_examples` examples uniformly with replacement.
	pub fn bootstrap(&self, rng: &mut impl Rng) -> Self {
		let n_examples = self.n_examples();
		let indexes: Vec<usize> = (0..n_examples)
			.map(|_| rng.gen_range(0, n_examples))
			.collect();
		self.subset(&indexes)
	}

	/// Draw `n_examples` examples with replacement, each with probability proportional to its weight. The drawn examples have unit weight.
	pub fn resample_with_weights(&self, rng: &mut impl Rng) -> Self {
		let n_examples = self.n_examples();
		let mut cumulative = Vec::with_capacity(n_examples);
		let mut total = 0.0f64;
		for weight in self.weights.iter() {
			total += f64::max(*weight as f64, 0.0);
			cumulative.push(total);
		}
		if total <= 0.0 {
			return self.bootstrap(rng);
		}
		let indexes: Vec<usize> = (0..n_examples)
			.map(|_| {
				let target = rng.gen::<f64>() * total;
				let index = cumulative.partition_point(|value| *value <= target);
				usize::min(index, n_examples - 1)
			})
			.collect();
		let mut resampled = self.subset(&indexes);
		resampled.weights = vec![1.0; n_examples];
		resampled
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::num::NonZeroUsize;
	use suinz_dataframe::{Column, ColumnType, DataFrame};

	pub fn dataframe() -> DataFrame {
		let mut dataframe = DataFrame::new(
			vec!["x".to_owned(), "color".to_owned(), "class".to_owned()],
			vec![
				ColumnType::Number,
				ColumnType::Enum {
					options: vec!["red".to_owned(), "blue".to_owned()],
				},
				ColumnType::Enum {
					options: vec!["no".to_owned(), "yes".to_owned()],
				},
			],
		);
		if let Column::Number(column) = &mut dataframe.columns[0] {
			column.data = vec![1.0, std::f32::NAN, 3.0, 4.0];
		}
		if let Column::Enum(column) = &mut dataframe.columns[1] {
			column.data = vec![
				NonZeroUsize::new(2),
				NonZeroUsize::new(1),
				None,
				NonZeroUsize::new(1),
			];
		}
		if let Column::Enum(column) = &mut dataframe.columns[2] {
			column.data = vec![
				NonZeroUsize::new(1),
				NonZeroUsize::new(2),
				NonZeroUsize::new(2),
				None,
			];
		}
		dataframe
	}

	#[test]
	fn test_encode() {
		let dataframe = dataframe();
		let schema = Schema::from_dataframe(&dataframe.view()).unwrap();
		assert_eq!(schema.classes, vec!["no".to_owned(), "yes".to_owned()]);
		assert_eq!(schema.attributes.len(), 2);
		let encoded = schema.encode(&dataframe.view());
		assert_eq!(encoded.labels, vec![Some(0), Some(1), Some(1), None]);
		assert_eq!(encoded.features[(0, 1)], 1.0);
		assert!(encoded.features[(1, 0)].is_nan());
		assert!(encoded.features[(2, 1)].is_nan());
	}

	#[test]
	fn test_instances_drop_missing_classes() {
		let dataframe = dataframe();
		let schema = Schema::from_dataframe(&dataframe.view()).unwrap();
		let instances = schema.instances(&dataframe.view());
		assert_eq!(instances.n_examples(), 3);
		assert_eq!(instances.labels, vec![0, 1, 1]);
		assert_eq!(instances.class_weights(), vec![1.0, 2.0]);
		assert_eq!(instances.majority_class(), 1);
	}

	#[test]
	fn test_rejects_text_and_numeric_class() {
		let mut dataframe = DataFrame::new(
			vec!["note".to_owned(), "class".to_owned()],
			vec![
				ColumnType::Text,
				ColumnType::Enum {
					options: vec!["a".to_owned()],
				},
			],
		);
		assert_eq!(
			Schema::from_dataframe(&dataframe.view()),
			Err(TrainError::UnsupportedAttribute("note".to_owned()))
		);
		dataframe.columns[1] = Column::Number(suinz_dataframe::NumberColumn::new(
			"class".to_owned(),
		));
		assert_eq!(
			Schema::from_dataframe(&dataframe.view()),
			Err(TrainError::NumericClass("class".to_owned()))
		);
	}

	#[test]
	fn test_bootstrap_is_deterministic() {
		let dataframe = dataframe();
		let schema = Schema::from_dataframe(&dataframe.view()).unwrap();
		let instances = schema.instances(&dataframe.view());
		let a = instances.bootstrap(&mut crate::rng(7));
		let b = instances.bootstrap(&mut crate::rng(7));
		assert_eq!(a.labels, b.labels);
		assert_eq!(a.n_examples(), instances.n_examples());
	}

	#[test]
	fn test_resample_with_weights_follows_weights() {
		let dataframe = dataframe();
		let schema = Schema::from_dataframe(&dataframe.view()).unwrap();
		let instances = schema
			.instances(&dataframe.view())
			.with_weights(vec![0.0, 0.0, 1.0]);
		let resampled = instances.resample_with_weights(&mut crate::rng(1));
		assert_eq!(resampled.labels, vec![1, 1, 1]);
		assert_eq!(resampled.features[(0, 0)], 3.0);
		assert_eq!(resampled.weights, vec![1.0, 1.0, 1.0]);
	}

	#[test]
	fn test_select_attributes() {
		let dataframe = dataframe();
		let schema = Schema::from_dataframe(&dataframe.view()).unwrap();
		let instances = schema.instances(&dataframe.view()).select_attributes(&[1]);
		assert_eq!(instances.n_attributes(), 1);
		assert_eq!(instances.attributes[0].name(), "color");
		assert_eq!(instances.features.ncols(), 1);
	}
}
