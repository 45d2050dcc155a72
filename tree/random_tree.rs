use crate::{
	grow::{grow, ChooseSplit, GrowOptions},
	node::Tree,
	split::{evaluate_attribute, Candidate, SplitOptions},
};
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256Plus;
use suinz_model::{rng, Instances, Learner, Model, TrainError};

/// A RandomTree is an unpruned tree that considers a random subset of the attributes at each node and splits by information gain.
#[derive(Clone, Debug)]
pub struct RandomTree {
	/// The number of attributes to consider at each node. If `None`, use floor(log2(n_attributes)) + 1.
	pub k_value: Option<usize>,
	pub min_instances_per_leaf: f64,
	pub max_depth: Option<usize>,
}

impl Default for RandomTree {
	fn default() -> Self {
		Self {
			k_value: None,
			min_instances_per_leaf: 1.0,
			max_depth: None,
		}
	}
}

impl Learner for RandomTree {
	fn train(&self, instances: &Instances, seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let n_attributes = instances.n_attributes();
		let k = self
			.k_value
			.unwrap_or_else(|| default_k(n_attributes))
			.max(1)
			.min(n_attributes.max(1));
		let mut chooser = RandomSubsetChooser {
			k,
			rng: rng(seed),
			options: SplitOptions {
				min_leaf_weight: self.min_instances_per_leaf,
				c45: false,
			},
		};
		let options = GrowOptions {
			min_leaf_weight: self.min_instances_per_leaf,
			max_depth: self.max_depth,
		};
		let items: Vec<(usize, f64)> = instances
			.weights
			.iter()
			.enumerate()
			.map(|(index, weight)| (index, *weight as f64))
			.collect();
		let root = grow(instances, &items, &options, &mut chooser, 0);
		Ok(Box::new(Tree {
			root,
			n_attributes,
			n_classes: instances.n_classes(),
		}))
	}
}

fn default_k(n_attributes: usize) -> usize {
	if n_attributes <= 1 {
		1
	} else {
		(n_attributes as f64).log2().floor() as usize + 1
	}
}

struct RandomSubsetChooser {
	k: usize,
	rng: Xoshiro256Plus,
	options: SplitOptions,
}

impl ChooseSplit for RandomSubsetChooser {
	/// Visit the attributes in random order. Stop once `k` have been evaluated and one of them has a positive gain.
	fn choose_split(&mut self, instances: &Instances, items: &[(usize, f64)]) -> Option<Candidate> {
		let mut attribute_indexes: Vec<usize> = (0..instances.n_attributes()).collect();
		attribute_indexes.shuffle(&mut self.rng);
		let mut best: Option<Candidate> = None;
		for (n_evaluated, attribute_index) in attribute_indexes.into_iter().enumerate() {
			let found_gain = best.as_ref().map(|best| best.gain > 0.0).unwrap_or(false);
			if n_evaluated >= self.k && found_gain {
				break;
			}
			let candidate = match evaluate_attribute(instances, items, attribute_index, self.options)
			{
				Some(candidate) => candidate,
				None => continue,
			};
			let is_better = best
				.as_ref()
				.map(|best| candidate.gain > best.gain)
				.unwrap_or(true);
			if is_better {
				best = Some(candidate);
			}
		}
		best.filter(|best| best.gain > 1e-10)
	}
}

#[test]
fn test_default_k() {
	assert_eq!(default_k(1), 1);
	assert_eq!(default_k(3), 2);
	assert_eq!(default_k(4), 3);
	assert_eq!(default_k(10), 4);
}
