use crate::{FeatureEncoder, Scaling};
use ndarray::prelude::*;
use suinz_model::{
	check_example, normalize, Instances, Learner, Model, PredictError, TrainError,
};

/**
SMO trains a linear support vector machine for every pair of classes using John Platt's sequential minimal optimization. Features are normalized to [0, 1] first. The class distribution of an example is the share of the pairwise votes each class wins.
*/
#[derive(Clone, Debug)]
pub struct SMO {
	/// The complexity constant. Each example's bound is this value times its weight.
	pub c: f64,
	/// The tolerance for violations of the optimality conditions.
	pub tolerance: f64,
	/// Training stops after this many passes over the examples even if it has not converged.
	pub max_passes: usize,
}

impl Default for SMO {
	fn default() -> Self {
		Self {
			c: 1.0,
			tolerance: 1e-3,
			max_passes: 1000,
		}
	}
}

/// The linear decision function `w . x - b`. Positive values vote for the second class of the pair.
#[derive(Clone, Debug)]
pub struct LinearSvm {
	pub weights: Array1<f64>,
	pub bias: f64,
}

#[derive(Clone, Debug)]
pub struct SMOModel {
	pub encoder: FeatureEncoder,
	/// The machine for each pair of classes (i, j) with i < j. `None` if one of the classes had no training examples, in which case the other class wins.
	pub machines: Vec<(usize, usize, Option<LinearSvm>)>,
	n_attributes: usize,
	n_classes: usize,
}

impl Learner for SMO {
	fn train(&self, instances: &Instances, _seed: u64) -> Result<Box<dyn Model>, TrainError> {
		instances.check_not_empty()?;
		let encoder = FeatureEncoder::fit(instances, Scaling::Normalize);
		let features = encoder.encode(instances).mapv(|value| value as f64);
		let n_classes = instances.n_classes();
		let mut machines = Vec::new();
		for first in 0..n_classes {
			for second in first + 1..n_classes {
				let indexes: Vec<usize> = (0..instances.n_examples())
					.filter(|index| {
						let label = instances.labels[*index];
						(label == first || label == second) && instances.weights[*index] > 0.0
					})
					.collect();
				let has_first = indexes.iter().any(|index| instances.labels[*index] == first);
				let has_second = indexes.iter().any(|index| instances.labels[*index] == second);
				let machine = if has_first && has_second {
					let x = features.select(Axis(0), &indexes);
					let y: Vec<f64> = indexes
						.iter()
						.map(|index| {
							if instances.labels[*index] == second {
								1.0
							} else {
								-1.0
							}
						})
						.collect();
					let bounds: Vec<f64> = indexes
						.iter()
						.map(|index| self.c * instances.weights[*index] as f64)
						.collect();
					Some(self.train_binary(x.view(), &y, &bounds))
				} else {
					None
				};
				machines.push((first, second, machine));
			}
		}
		Ok(Box::new(SMOModel {
			encoder,
			machines,
			n_attributes: instances.n_attributes(),
			n_classes,
		}))
	}
}

struct Solver<'a> {
	x: ArrayView2<'a, f64>,
	y: &'a [f64],
	bounds: &'a [f64],
	alphas: Vec<f64>,
	weights: Array1<f64>,
	bias: f64,
	tolerance: f64,
}

const EPSILON: f64 = 1e-12;

impl<'a> Solver<'a> {
	fn output(&self, index: usize) -> f64 {
		self.x.row(index).dot(&self.weights) - self.bias
	}

	fn error(&self, index: usize) -> f64 {
		self.output(index) - self.y[index]
	}

	fn kernel(&self, a: usize, b: usize) -> f64 {
		self.x.row(a).dot(&self.x.row(b))
	}

	fn is_unbound(&self, index: usize) -> bool {
		self.alphas[index] > EPSILON && self.alphas[index] < self.bounds[index] - EPSILON
	}

	/// Jointly optimize the alphas of examples `i1` and `i2`. Returns whether they changed.
	fn take_step(&mut self, i1: usize, i2: usize) -> bool {
		if i1 == i2 {
			return false;
		}
		let (alpha1, alpha2) = (self.alphas[i1], self.alphas[i2]);
		let (y1, y2) = (self.y[i1], self.y[i2]);
		let (c1, c2) = (self.bounds[i1], self.bounds[i2]);
		let (e1, e2) = (self.error(i1), self.error(i2));
		let s = y1 * y2;
		let (low, high) = if y1 != y2 {
			((alpha2 - alpha1).max(0.0), c2.min(c1 + alpha2 - alpha1))
		} else {
			((alpha1 + alpha2 - c1).max(0.0), c2.min(alpha1 + alpha2))
		};
		if high - low < EPSILON {
			return false;
		}
		let k11 = self.kernel(i1, i1);
		let k12 = self.kernel(i1, i2);
		let k22 = self.kernel(i2, i2);
		let eta = k11 + k22 - 2.0 * k12;
		let mut new_alpha2 = if eta > 0.0 {
			(alpha2 + y2 * (e1 - e2) / eta).max(low).min(high)
		} else {
			// The objective is linear along the constraint, so its optimum is at an end.
			let f1 = y1 * (e1 + self.bias) - alpha1 * k11 - s * alpha2 * k12;
			let f2 = y2 * (e2 + self.bias) - s * alpha1 * k12 - alpha2 * k22;
			let objective = |alpha2_end: f64| {
				let alpha1_end = alpha1 + s * (alpha2 - alpha2_end);
				alpha1_end * f1
					+ alpha2_end * f2 + 0.5 * alpha1_end * alpha1_end * k11
					+ 0.5 * alpha2_end * alpha2_end * k22
					+ s * alpha2_end * alpha1_end * k12
			};
			let (low_objective, high_objective) = (objective(low), objective(high));
			if low_objective < high_objective - EPSILON {
				low
			} else if low_objective > high_objective + EPSILON {
				high
			} else {
				alpha2
			}
		};
		if (new_alpha2 - alpha2).abs() < EPSILON * (new_alpha2 + alpha2 + EPSILON) {
			return false;
		}
		let mut new_alpha1 = alpha1 + s * (alpha2 - new_alpha2);
		if new_alpha1 < 0.0 {
			new_alpha2 += s * new_alpha1;
			new_alpha1 = 0.0;
		} else if new_alpha1 > c1 {
			new_alpha2 += s * (new_alpha1 - c1);
			new_alpha1 = c1;
		}
		let delta1 = y1 * (new_alpha1 - alpha1);
		let delta2 = y2 * (new_alpha2 - alpha2);
		let b1 = e1 + delta1 * k11 + delta2 * k12 + self.bias;
		let b2 = e2 + delta1 * k12 + delta2 * k22 + self.bias;
		self.bias = if new_alpha1 > 0.0 && new_alpha1 < c1 {
			b1
		} else if new_alpha2 > 0.0 && new_alpha2 < c2 {
			b2
		} else {
			0.5 * (b1 + b2)
		};
		self.weights.scaled_add(delta1, &self.x.row(i1));
		self.weights.scaled_add(delta2, &self.x.row(i2));
		self.alphas[i1] = new_alpha1;
		self.alphas[i2] = new_alpha2;
		true
	}

	/// Look for a partner for `i2` if it violates the optimality conditions. Returns whether a step was taken.
	fn examine(&mut self, i2: usize) -> bool {
		let n = self.y.len();
		let e2 = self.error(i2);
		let r2 = e2 * self.y[i2];
		let alpha2 = self.alphas[i2];
		let violates = (r2 < -self.tolerance && alpha2 < self.bounds[i2])
			|| (r2 > self.tolerance && alpha2 > 0.0);
		if !violates {
			return false;
		}
		let unbound: Vec<usize> = (0..n).filter(|index| self.is_unbound(*index)).collect();
		if unbound.len() > 1 {
			let mut best = None;
			let mut best_gap = -1.0;
			for index in unbound.iter() {
				let gap = (self.error(*index) - e2).abs();
				if gap > best_gap {
					best_gap = gap;
					best = Some(*index);
				}
			}
			if let Some(i1) = best {
				if self.take_step(i1, i2) {
					return true;
				}
			}
		}
		let start = (i2 + 1) % n;
		for offset in 0..unbound.len() {
			let i1 = unbound[(start + offset) % unbound.len()];
			if self.take_step(i1, i2) {
				return true;
			}
		}
		for offset in 0..n {
			if self.take_step((start + offset) % n, i2) {
				return true;
			}
		}
		false
	}
}

impl SMO {
	/// Train a binary machine on `x` with labels `y` of -1 or 1.
	pub fn train_binary<'a>(
		&self,
		x: ArrayView2<'a, f64>,
		y: &'a [f64],
		bounds: &'a [f64],
	) -> LinearSvm {
		let n = y.len();
		let mut solver = Solver {
			x,
			y,
			bounds,
			alphas: vec![0.0; n],
			weights: Array1::zeros(x.ncols()),
			bias: 0.0,
			tolerance: self.tolerance,
		};
		let mut examine_all = true;
		let mut n_changed = 0;
		let mut n_passes = 0;
		while (n_changed > 0 || examine_all) && n_passes < self.max_passes {
			n_changed = 0;
			for index in 0..n {
				if (examine_all || solver.is_unbound(index)) && solver.examine(index) {
					n_changed += 1;
				}
			}
			if examine_all {
				examine_all = false;
			} else if n_changed == 0 {
				examine_all = true;
			}
			n_passes += 1;
		}
		LinearSvm {
			weights: solver.weights,
			bias: solver.bias,
		}
	}
}

impl LinearSvm {
	pub fn output(&self, features: ArrayView1<f64>) -> f64 {
		features.dot(&self.weights) - self.bias
	}
}

impl Model for SMOModel {
	fn distribution(&self, example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
		check_example(self.n_attributes, example)?;
		let features = self.encoder.encode_example(example).mapv(|value| value as f64);
		let mut votes = Array1::<f32>::zeros(self.n_classes);
		for (first, second, machine) in self.machines.iter() {
			let winner = match machine {
				Some(machine) => {
					if machine.output(features.view()) > 0.0 {
						*second
					} else {
						*first
					}
				}
				None => continue,
			};
			votes[winner] += 1.0;
		}
		normalize(&mut votes);
		Ok(votes)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::datasets;

	#[test]
	fn test_binary_margin() {
		let x = arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
		let y = [-1.0, -1.0, 1.0, 1.0];
		let machine = SMO::default().train_binary(x.view(), &y, &[1.0; 4]);
		for (row, label) in x.genrows().into_iter().zip(y.iter()) {
			assert!(machine.output(row) * label > 0.0);
		}
		// the maximum margin separator is x0 = 0.5
		assert!((machine.weights[0] - 2.0).abs() < 1e-2);
		assert!(machine.weights[1].abs() < 1e-2);
		assert!((machine.bias - 1.0).abs() < 1e-2);
	}

	#[test]
	fn test_blobs() {
		let instances = datasets::blobs();
		let model = SMO::default().train(&instances, 1).unwrap();
		let accuracy = datasets::training_accuracy(model.as_ref(), &instances);
		assert!(accuracy > 0.95);
	}

	#[test]
	fn test_zero_bound_example_is_ignored() {
		let x = arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0], [0.2, 0.5]]);
		let y: Vec<f64> = vec![-1.0, -1.0, 1.0, 1.0, 1.0];
		let bounds: Vec<f64> = y.iter().take(4).map(|_| 1.0).chain(Some(0.0)).collect();
		let machine = SMO::default().train_binary(x.view(), &y, &bounds);
		for (row, label) in x.genrows().into_iter().zip(y.iter()).take(4) {
			assert!(machine.output(row) * label > 0.0);
		}
		assert!(machine.output(x.row(4)) < 0.0);
	}
}
