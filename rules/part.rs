use crate::rule::{to_distribution, Condition, Rule, RuleList};
use suinz_model::{Instances, Learner, Model, TrainError};
use suinz_tree::{BranchSplit, Node, J48};

/**
PART learns a decision list from partial C4.5 trees. Each round grows and prunes a tree on the examples no rule covers yet, turns the leaf covering the most weight into a rule, and removes the examples it covers. Once the tree is a single leaf, the examples that remain make up the default rule.
*/
#[derive(Clone, Debug, Default)]
pub struct PART {
	/// The options of the trees each rule is read from.
	pub tree: J48,
}

impl Learner for PART {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let mut remaining: Vec<usize> = (0..instances.n_examples())
			.filter(|index| instances.weights[*index] > 0.0)
			.collect();
		let mut rules = Vec::new();
		while !remaining.is_empty() {
			let items: Vec<(usize, f64)> = remaining
				.iter()
				.map(|index| (*index, instances.weights[*index] as f64))
				.collect();
			let root = self.tree.grow_tree(instances, &items);
			if root.is_leaf() {
				break;
			}
			let mut best = None;
			largest_leaf(&root, &mut Vec::new(), &mut best);
			let conditions = match best {
				Some((_, conditions)) => conditions,
				None => break,
			};
			let (covered, uncovered): (Vec<usize>, Vec<usize>) =
				remaining.iter().partition(|index| {
					let example = instances.features.row(**index);
					conditions.iter().all(|condition| condition.matches(example))
				});
			if covered.is_empty() {
				break;
			}
			rules.push(Rule {
				conditions,
				distribution: to_distribution(&class_counts(instances, &covered)),
			});
			remaining = uncovered;
		}
		let remaining_counts = class_counts(instances, &remaining);
		let default = if remaining_counts.iter().sum::<f64>() > 0.0 {
			to_distribution(&remaining_counts)
		} else {
			to_distribution(&instances.class_weights())
		};
		Ok(Box::new(RuleList {
			rules,
			default,
			n_attributes: instances.n_attributes(),
		}))
	}
}

pub(crate) fn class_counts(instances: &Instances, indexes: &[usize]) -> Vec<f64> {
	let mut counts = vec![0.0; instances.n_classes()];
	for index in indexes {
		counts[instances.labels[*index]] += instances.weights[*index] as f64;
	}
	counts
}

/// Find the leaf with the most training weight and the conditions on the path to it. Ties go to the leftmost leaf.
fn largest_leaf(
	node: &Node,
	path: &mut Vec<Condition>,
	best: &mut Option<(f64, Vec<Condition>)>,
) {
	match node {
		Node::Leaf(leaf) => {
			let coverage: f64 = leaf.class_counts.iter().sum();
			let is_better = best
				.as_ref()
				.map(|(best_coverage, _)| coverage > *best_coverage)
				.unwrap_or(coverage > 0.0);
			if is_better {
				*best = Some((coverage, path.clone()));
			}
		}
		Node::Branch(branch) => {
			for (child_index, child) in branch.children.iter().enumerate() {
				let condition = match &branch.split {
					BranchSplit::Continuous(split) if child_index == 0 => Condition::LessOrEqual {
						attribute_index: split.attribute_index,
						value: split.split_value,
					},
					BranchSplit::Continuous(split) => Condition::Greater {
						attribute_index: split.attribute_index,
						value: split.split_value,
					},
					BranchSplit::Discrete(split) => Condition::Equals {
						attribute_index: split.attribute_index,
						option: child_index,
					},
				};
				path.push(condition);
				largest_leaf(child, path, best);
				path.pop();
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;
	use suinz_tree::{BranchNode, BranchSplitDiscrete, LeafNode};

	#[test]
	fn test_largest_leaf() {
		let root = Node::Branch(BranchNode {
			split: BranchSplit::Discrete(BranchSplitDiscrete {
				attribute_index: 2,
				n_options: 2,
			}),
			children: vec![
				Node::Leaf(LeafNode {
					class_counts: vec![2.0, 1.0],
				}),
				Node::Leaf(LeafNode {
					class_counts: vec![0.0, 5.0],
				}),
			],
			branch_weights: vec![0.375, 0.625],
			class_counts: vec![2.0, 6.0],
		});
		let mut best = None;
		largest_leaf(&root, &mut Vec::new(), &mut best);
		let (coverage, conditions) = best.unwrap();
		assert_eq!(coverage, 5.0);
		assert_eq!(conditions, vec![Condition::Equals {
			attribute_index: 2,
			option: 1
		}]);
	}

	#[test]
	fn test_blobs_rules() {
		let instances = datasets::blobs();
		let model = PART::default().train(&instances, 1).unwrap();
		// two rules separate the first two classes and the default takes the third
		assert_eq!(datasets::training_accuracy(model.as_ref(), &instances), 1.0);
	}
}
