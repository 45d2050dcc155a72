use crate::softmax;
use ndarray::prelude::*;
use suinz_model::{
	check_example, discretize::Discretizer, enum_index, math::ln_gamma, Instances, Learner, Model,
	PredictError, TrainError,
};

/**
A BayesNet is a Bayesian network classifier. Number attributes are discretized first. The class is a parent of every attribute, and a K2 search over the attributes in order gives each attribute up to `max_parents` more parents from the attributes before it, as long as each one improves the Bayesian Dirichlet score of the network.
*/
#[derive(Clone, Debug)]
pub struct BayesNet {
	/// The maximum number of parents of an attribute, not counting the class.
	pub max_parents: usize,
	/// The Dirichlet prior count added to every cell of the conditional probability tables.
	pub alpha: f64,
}

impl Default for BayesNet {
	fn default() -> Self {
		Self {
			max_parents: 1,
			alpha: 0.5,
		}
	}
}

#[derive(Clone, Debug)]
pub struct BayesNetModel {
	pub discretizer: Discretizer,
	pub class_log_priors: Vec<f64>,
	pub nodes: Vec<BayesNetNode>,
}

/// The conditional probability table of one attribute.
#[derive(Clone, Debug)]
pub struct BayesNetNode {
	/// The parent attributes besides the class.
	pub parents: Vec<usize>,
	/// (n_parent_configurations, n_options) log probabilities. The configurations enumerate the class first, then each parent's option.
	pub log_probabilities: Array2<f64>,
	/// (n_classes, n_options) log probabilities given only the class, used when a parent's value is missing.
	pub class_log_probabilities: Array2<f64>,
}

impl Learner for BayesNet {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let discretizer = Discretizer::fit(instances);
		let instances = discretizer.transform(instances);
		let n_classes = instances.n_classes();
		let n_options: Vec<usize> = instances
			.attributes
			.iter()
			.map(|attribute| attribute.n_options().unwrap_or(1).max(1))
			.collect();
		let class_weights = instances.class_weights();
		let total_weight: f64 = class_weights.iter().sum();
		let class_log_priors = class_weights
			.iter()
			.map(|weight| {
				((weight + self.alpha) / (total_weight + n_classes as f64 * self.alpha)).ln()
			})
			.collect();
		let mut nodes = Vec::with_capacity(instances.n_attributes());
		for attribute_index in 0..instances.n_attributes() {
			let mut parents: Vec<usize> = Vec::new();
			let mut best_score = self.score(&instances, &n_options, attribute_index, &parents);
			while parents.len() < self.max_parents {
				let mut best_parent = None;
				for candidate in 0..attribute_index {
					if parents.contains(&candidate) {
						continue;
					}
					let mut with_candidate = parents.clone();
					with_candidate.push(candidate);
					let score = self.score(&instances, &n_options, attribute_index, &with_candidate);
					if score > best_score {
						best_score = score;
						best_parent = Some(candidate);
					}
				}
				match best_parent {
					Some(parent) => parents.push(parent),
					None => break,
				}
			}
			let parent_counts = counts(&instances, &n_options, attribute_index, &parents);
			let class_counts = counts(&instances, &n_options, attribute_index, &[]);
			nodes.push(BayesNetNode {
				log_probabilities: self.log_probabilities(&parent_counts),
				class_log_probabilities: self.log_probabilities(&class_counts),
				parents,
			});
		}
		Ok(Box::new(BayesNetModel {
			discretizer,
			class_log_priors,
			nodes,
		}))
	}
}

impl BayesNet {
	/// The Bayesian Dirichlet score of an attribute's table with the class and `parents` as its parents.
	fn score(
		&self,
		instances: &Instances,
		n_options: &[usize],
		attribute_index: usize,
		parents: &[usize],
	) -> f64 {
		let counts = counts(instances, n_options, attribute_index, parents);
		let r = counts.ncols() as f64;
		let alpha = self.alpha;
		counts
			.genrows()
			.into_iter()
			.map(|row| {
				let total = row.sum();
				let cells: f64 = row
					.iter()
					.map(|count| ln_gamma(alpha + count) - ln_gamma(alpha))
					.sum();
				ln_gamma(r * alpha) - ln_gamma(r * alpha + total) + cells
			})
			.sum()
	}

	fn log_probabilities(&self, counts: &Array2<f64>) -> Array2<f64> {
		let mut log_probabilities = counts.clone();
		let r = counts.ncols() as f64;
		for mut row in log_probabilities.genrows_mut() {
			let total = row.sum();
			row.mapv_inplace(|count| ((count + self.alpha) / (total + r * self.alpha)).ln());
		}
		log_probabilities
	}
}

/// The index of the parent configuration of `example`, or `None` if a parent's value is missing.
fn configuration(
	example: ArrayView1<f32>,
	class: usize,
	n_options: &[usize],
	parents: &[usize],
) -> Option<usize> {
	let mut index = class;
	for parent in parents {
		let option = enum_index(example[*parent], n_options[*parent])?;
		index = index * n_options[*parent] + option;
	}
	Some(index)
}

fn counts(
	instances: &Instances,
	n_options: &[usize],
	attribute_index: usize,
	parents: &[usize],
) -> Array2<f64> {
	let n_configurations = parents
		.iter()
		.map(|parent| n_options[*parent])
		.product::<usize>()
		* instances.n_classes();
	let mut counts = Array2::zeros((n_configurations, n_options[attribute_index]));
	for ((example, label), weight) in instances
		.features
		.genrows()
		.into_iter()
		.zip(instances.labels.iter())
		.zip(instances.weights.iter())
	{
		let option = match enum_index(example[attribute_index], n_options[attribute_index]) {
			Some(option) => option,
			None => continue,
		};
		if let Some(configuration) = configuration(example, *label, n_options, parents) {
			counts[(configuration, option)] += *weight as f64;
		}
	}
	counts
}

impl Model for BayesNetModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.nodes.len(), example)?;
		let example = self.discretizer.transform_example(example);
		let n_options: Vec<usize> = self
			.nodes
			.iter()
			.map(|node| node.log_probabilities.ncols())
			.collect();
		let mut log_probabilities = self.class_log_priors.clone();
		for (class, log_probability) in log_probabilities.iter_mut().enumerate() {
			for (attribute_index, node) in self.nodes.iter().enumerate() {
				let option = match enum_index(example[attribute_index], n_options[attribute_index]) {
					Some(option) => option,
					None => continue,
				};
				*log_probability +=
					match configuration(example.view(), class, &n_options, &node.parents) {
						Some(configuration) => node.log_probabilities[(configuration, option)],
						None => node.class_log_probabilities[(class, option)],
					};
			}
		}
		Ok(softmax(&log_probabilities))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::{datasets, Attribute};

	#[test]
	fn test_copied_attribute_becomes_a_parent() {
		// The last attribute is a function of outlook, so outlook explains it completely.
		let mut instances = datasets::weather();
		let outlook = instances.features.column(0).to_owned();
		instances.features.column_mut(3).assign(&outlook.mapv(|value| value.min(1.0)));
		instances.attributes[3] = Attribute::Enum {
			name: "copy".to_owned(),
			options: vec!["a".to_owned(), "b".to_owned()],
		};
		let model = BayesNet::default().train(&instances, 1).unwrap();
		let example = arr1(&[0.0, 70.0, 80.0, 0.0]);
		assert!(model.distribution(example.view()).is_ok());
		let learner = BayesNet::default();
		let instances = Discretizer::fit(&instances).transform(&instances);
		let n_options: Vec<usize> = instances
			.attributes
			.iter()
			.map(|attribute| attribute.n_options().unwrap_or(1))
			.collect();
		let without = learner.score(&instances, &n_options, 3, &[]);
		let with = learner.score(&instances, &n_options, 3, &[0]);
		assert!(with > without);
	}

	#[test]
	fn test_without_parents_matches_smoothed_counts() {
		let instances = datasets::weather().select_attributes(&[0]);
		let model = BayesNet::default().train(&instances, 1).unwrap();
		// overcast: yes 4 of 9, no 0 of 5, with alpha 0.5 over 3 options
		let distribution = model.distribution(arr1(&[1.0]).view()).unwrap();
		let yes = (9.5 / 15.0) * (4.5 / 10.5);
		let no = (5.5 / 15.0) * (0.5 / 6.5);
		assert!((distribution[0] as f64 - yes / (yes + no)).abs() < 1e-5);
	}

	#[test]
	fn test_missing_parent_uses_class_table() {
		// copy is b exactly when outlook is not sunny: yes 7 of 9, no 2 of 5
		let mut instances = datasets::weather();
		let outlook = instances.features.column(0).to_owned();
		instances.features.column_mut(3).assign(&outlook.mapv(|value| value.min(1.0)));
		instances.attributes[3] = Attribute::Enum {
			name: "copy".to_owned(),
			options: vec!["a".to_owned(), "b".to_owned()],
		};
		let instances = instances.select_attributes(&[0, 3]);
		let model = BayesNet::default().train(&instances, 1).unwrap();
		let distribution = model
			.distribution(arr1(&[std::f32::NAN, 1.0]).view())
			.unwrap();
		let yes = (9.5 / 15.0) * (7.5 / 10.0);
		let no = (5.5 / 15.0) * (2.5 / 6.0);
		assert!((distribution[0] as f64 - yes / (yes + no)).abs() < 1e-5);
	}
}
