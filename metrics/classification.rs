use super::{auc_roc, StreamingMetric};
use itertools::izip;
use ndarray::prelude::*;
use num_traits::ToPrimitive;

/// `ClassificationMetrics` computes the confusion matrix and the summary and per class statistics of a classifier evaluated on a set of labeled examples.
#[derive(Clone, Debug)]
pub struct ClassificationMetrics {
	/// The shape of the confusion matrix is (n_classes x n_classes). Rows are actual classes and columns are predicted classes.
	confusion_matrix: Array2<u64>,
	/// The class distribution a classifier that ignores its input would predict, estimated from the training class weights.
	prior: Array1<f64>,
	/// The number of examples whose class was missing.
	n_ignored: u64,
	sum_absolute_error: f64,
	sum_squared_error: f64,
	sum_prior_absolute_error: f64,
	sum_prior_squared_error: f64,
	/// The predicted distribution and label of every counted example, kept for the ROC curves.
	probabilities: Vec<Array1<f32>>,
	labels: Vec<usize>,
}

pub struct ClassificationMetricsInput<'a> {
	/// (n_classes)
	pub probabilities: ArrayView1<'a, f32>,
	/// 0-indexed, `None` if the example's class is missing.
	pub label: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationMetricsOutput {
	pub confusion_matrix: Array2<u64>,
	/// The number of examples with a class, which are the ones counted in the confusion matrix.
	pub n_examples: u64,
	pub n_correct: u64,
	pub n_incorrect: u64,
	pub n_ignored: u64,
	pub accuracy: Option<f32>,
	pub error_rate: Option<f32>,
	pub kappa: Option<f32>,
	pub mean_absolute_error: Option<f32>,
	pub root_mean_squared_error: Option<f32>,
	/// Percent of the absolute error of the prior classifier.
	pub relative_absolute_error: Option<f32>,
	/// Percent of the root squared error of the prior classifier.
	pub root_relative_squared_error: Option<f32>,
	pub class_metrics: Vec<ClassMetrics>,
	pub weighted_average: AverageClassMetrics,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassMetrics {
	pub true_positives: u64,
	pub false_positives: u64,
	pub true_negatives: u64,
	pub false_negatives: u64,
	pub true_positive_rate: Option<f32>,
	pub false_positive_rate: Option<f32>,
	pub precision: Option<f32>,
	pub recall: Option<f32>,
	pub f1_score: Option<f32>,
	pub matthews_correlation_coefficient: Option<f32>,
	pub auc_roc: Option<f32>,
}

/// Per class metrics averaged with each class weighted by its number of actual examples. Classes where a metric is undefined are left out of its average.
#[derive(Clone, Debug, PartialEq)]
pub struct AverageClassMetrics {
	pub true_positive_rate: Option<f32>,
	pub false_positive_rate: Option<f32>,
	pub precision: Option<f32>,
	pub recall: Option<f32>,
	pub f1_score: Option<f32>,
	pub matthews_correlation_coefficient: Option<f32>,
	pub auc_roc: Option<f32>,
}

impl ClassificationMetrics {
	/// Create metrics for `n_classes` classes. The prior is the training class weights with one added to each class.
	pub fn new(n_classes: usize, training_class_weights: &[f32]) -> Self {
		let mut prior: Array1<f64> = (0..n_classes)
			.map(|class_index| {
				training_class_weights
					.get(class_index)
					.and_then(|weight| weight.to_f64())
					.unwrap_or(0.0)
					+ 1.0
			})
			.collect();
		let total = prior.sum();
		if total > 0.0 {
			prior /= total;
		}
		//                                              actual    prediction
		//                                                 |           |
		//                                                 v           v
		let confusion_matrix = <Array2<u64>>::zeros((n_classes, n_classes));
		Self {
			confusion_matrix,
			prior,
			n_ignored: 0,
			sum_absolute_error: 0.0,
			sum_squared_error: 0.0,
			sum_prior_absolute_error: 0.0,
			sum_prior_squared_error: 0.0,
			probabilities: Vec::new(),
			labels: Vec::new(),
		}
	}

	pub fn n_classes(&self) -> usize {
		self.confusion_matrix.nrows()
	}
}

/// The index of the largest value, with ties going to the lowest index.
pub fn argmax(values: ArrayView1<f32>) -> usize {
	let mut best = 0;
	for (index, value) in values.iter().enumerate() {
		if *value > values[best] {
			best = index;
		}
	}
	best
}

impl<'a> StreamingMetric<'a> for ClassificationMetrics {
	type Input = ClassificationMetricsInput<'a>;
	type Output = ClassificationMetricsOutput;

	fn update(&mut self, input: ClassificationMetricsInput<'a>) {
		let n_classes = self.n_classes();
		let label = match input.label {
			Some(label) if label < n_classes && input.probabilities.len() == n_classes => label,
			_ => {
				self.n_ignored += 1;
				return;
			}
		};
		let prediction = argmax(input.probabilities);
		self.confusion_matrix[(label, prediction)] += 1;
		for (class_index, (probability, prior)) in
			input.probabilities.iter().zip(self.prior.iter()).enumerate()
		{
			let actual = if class_index == label { 1.0 } else { 0.0 };
			let error = probability.to_f64().unwrap_or(0.0) - actual;
			self.sum_absolute_error += error.abs();
			self.sum_squared_error += error * error;
			let prior_error = prior - actual;
			self.sum_prior_absolute_error += prior_error.abs();
			self.sum_prior_squared_error += prior_error * prior_error;
		}
		self.probabilities.push(input.probabilities.to_owned());
		self.labels.push(label);
	}

	fn merge(&mut self, other: Self) {
		self.confusion_matrix += &other.confusion_matrix;
		self.n_ignored += other.n_ignored;
		self.sum_absolute_error += other.sum_absolute_error;
		self.sum_squared_error += other.sum_squared_error;
		self.sum_prior_absolute_error += other.sum_prior_absolute_error;
		self.sum_prior_squared_error += other.sum_prior_squared_error;
		self.probabilities.extend(other.probabilities);
		self.labels.extend(other.labels);
	}

	fn finalize(self) -> ClassificationMetricsOutput {
		let n_classes = self.n_classes();
		let confusion_matrix = self.confusion_matrix;
		let example_probabilities = self.probabilities;
		let labels = self.labels;
		let n_examples: u64 = confusion_matrix.sum();
		let n_correct: u64 = confusion_matrix.diag().sum();
		let n_incorrect = n_examples - n_correct;
		let total = n_examples.to_f64().unwrap_or(0.0);
		let n_actual = confusion_matrix.sum_axis(Axis(1));
		let n_predicted = confusion_matrix.sum_axis(Axis(0));
		let class_metrics: Vec<ClassMetrics> = (0..n_classes)
			.map(|class_index| {
				let true_positives = confusion_matrix[(class_index, class_index)];
				let false_negatives = n_actual[class_index] - true_positives;
				let false_positives = n_predicted[class_index] - true_positives;
				let true_negatives =
					n_examples - true_positives - false_positives - false_negatives;
				let tp = true_positives as f64;
				let fp = false_positives as f64;
				let tn = true_negatives as f64;
				let fn_ = false_negatives as f64;
				let recall = ratio(tp, tp + fn_);
				let precision = ratio(tp, tp + fp);
				let f1_score = match (precision, recall) {
					(Some(precision), Some(recall)) if precision + recall > 0.0 => {
						Some(2.0 * precision * recall / (precision + recall))
					}
					(Some(_), Some(_)) => Some(0.0),
					_ => None,
				};
				let matthews_correlation_coefficient =
					ratio(tp * tn - fp * fn_, ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt());
				let probabilities: Vec<f32> = example_probabilities
					.iter()
					.map(|probabilities| probabilities[class_index])
					.collect();
				let positives: Vec<bool> = labels
					.iter()
					.map(|label| *label == class_index)
					.collect();
				ClassMetrics {
					true_positives,
					false_positives,
					true_negatives,
					false_negatives,
					true_positive_rate: recall.map(to_f32),
					false_positive_rate: ratio(fp, fp + tn).map(to_f32),
					precision: precision.map(to_f32),
					recall: recall.map(to_f32),
					f1_score: f1_score.map(to_f32),
					matthews_correlation_coefficient: matthews_correlation_coefficient.map(to_f32),
					auc_roc: auc_roc(&probabilities, &positives),
				}
			})
			.collect();
		let class_weights: Vec<f64> = n_actual.iter().map(|n| *n as f64).collect();
		let weighted_average = AverageClassMetrics {
			true_positive_rate: weighted_average(&class_metrics, &class_weights, |c| {
				c.true_positive_rate
			}),
			false_positive_rate: weighted_average(&class_metrics, &class_weights, |c| {
				c.false_positive_rate
			}),
			precision: weighted_average(&class_metrics, &class_weights, |c| c.precision),
			recall: weighted_average(&class_metrics, &class_weights, |c| c.recall),
			f1_score: weighted_average(&class_metrics, &class_weights, |c| c.f1_score),
			matthews_correlation_coefficient: weighted_average(
				&class_metrics,
				&class_weights,
				|c| c.matthews_correlation_coefficient,
			),
			auc_roc: weighted_average(&class_metrics, &class_weights, |c| c.auc_roc),
		};
		let accuracy = ratio(n_correct as f64, total);
		let error_rate = ratio(n_incorrect as f64, total);
		// Cohen's kappa compares the observed agreement with the agreement expected by chance.
		let kappa = accuracy.map(|accuracy| {
			let chance = n_actual
				.iter()
				.zip(n_predicted.iter())
				.map(|(actual, predicted)| (*actual as f64) * (*predicted as f64))
				.sum::<f64>()
				/ (total * total);
			if chance < 1.0 {
				(accuracy - chance) / (1.0 - chance)
			} else {
				1.0
			}
		});
		let n_terms = total * n_classes as f64;
		let mean_absolute_error = ratio(self.sum_absolute_error, n_terms);
		let root_mean_squared_error = ratio(self.sum_squared_error, n_terms).map(f64::sqrt);
		let relative_absolute_error = if n_examples > 0 {
			ratio(self.sum_absolute_error, self.sum_prior_absolute_error).map(|r| 100.0 * r)
		} else {
			None
		};
		let root_relative_squared_error = if n_examples > 0 {
			ratio(self.sum_squared_error, self.sum_prior_squared_error)
				.map(|r| 100.0 * r.sqrt())
		} else {
			None
		};
		ClassificationMetricsOutput {
			confusion_matrix,
			n_examples,
			n_correct,
			n_incorrect,
			n_ignored: self.n_ignored,
			accuracy: accuracy.map(to_f32),
			error_rate: error_rate.map(to_f32),
			kappa: kappa.map(to_f32),
			mean_absolute_error: mean_absolute_error.map(to_f32),
			root_mean_squared_error: root_mean_squared_error.map(to_f32),
			relative_absolute_error: relative_absolute_error.map(to_f32),
			root_relative_squared_error: root_relative_squared_error.map(to_f32),
			class_metrics,
			weighted_average,
		}
	}
}

/// Divide, returning `None` when the quotient is undefined.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
	if denominator > 0.0 && denominator.is_finite() {
		Some(numerator / denominator)
	} else {
		None
	}
}

fn to_f32(value: f64) -> f32 {
	value as f32
}

fn weighted_average(
	class_metrics: &[ClassMetrics],
	class_weights: &[f64],
	metric: impl Fn(&ClassMetrics) -> Option<f32>,
) -> Option<f32> {
	let mut sum = 0.0;
	let mut weight_sum = 0.0;
	for (class_metrics, weight) in izip!(class_metrics, class_weights) {
		if let Some(value) = metric(class_metrics) {
			sum += value as f64 * weight;
			weight_sum += weight;
		}
	}
	ratio(sum, weight_sum).map(to_f32)
}

#[cfg(test)]
fn evaluate(n_classes: usize, labels: &[usize], predictions: &[usize]) -> ClassificationMetricsOutput {
	let mut metrics = ClassificationMetrics::new(n_classes, &vec![1.0; n_classes]);
	for (label, prediction) in labels.iter().zip(predictions.iter()) {
		let mut probabilities = Array1::<f32>::zeros(n_classes);
		probabilities[*prediction] = 1.0;
		metrics.update(ClassificationMetricsInput {
			probabilities: probabilities.view(),
			label: Some(*label),
		});
	}
	metrics.finalize()
}

#[cfg(test)]
fn assert_close(value: Option<f32>, expected: f32) {
	let value = value.unwrap();
	assert!(
		(value - expected).abs() < 1e-4,
		"expected {} but got {}",
		expected,
		value
	);
}

#[test]
fn test_binary() {
	let labels = [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
	let predictions = [0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0];
	let metrics = evaluate(2, &labels, &predictions);
	assert_eq!(metrics.confusion_matrix, arr2(&[[5, 3], [2, 3]]));
	assert_eq!(metrics.n_correct, 8);
	assert_eq!(metrics.n_incorrect, 5);
	assert_close(metrics.accuracy, 0.61538464);
	let cat = &metrics.class_metrics[0];
	assert_eq!(
		(cat.true_positives, cat.false_positives, cat.true_negatives, cat.false_negatives),
		(5, 2, 3, 3)
	);
	assert_close(cat.precision, 0.71428573);
	assert_close(cat.recall, 0.625);
	assert_close(cat.f1_score, 0.6666667);
	let dog = &metrics.class_metrics[1];
	assert_close(dog.precision, 0.5);
	assert_close(dog.recall, 0.6);
	assert_close(dog.f1_score, 0.54545456);
	assert_close(metrics.weighted_average.precision, 0.6318681);
	assert_close(metrics.weighted_average.recall, 0.61538464);
	// chance agreement is (8 * 7 + 5 * 6) / 169
	assert_close(metrics.kappa, (8.0 / 13.0 - 86.0 / 169.0) / (1.0 - 86.0 / 169.0));
	// each mistake puts one unit of error on both classes
	assert_close(metrics.mean_absolute_error, 5.0 / 13.0);
	assert_close(metrics.root_mean_squared_error, (5.0f32 / 13.0).sqrt());
}

#[test]
fn test_multiclass() {
	// example taken from https://en.wikipedia.org/wiki/Confusion_matrix
	let labels = [
		0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1, 2, 2, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
	];
	let predictions = [
		0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
	];
	let metrics = evaluate(3, &labels, &predictions);
	assert_eq!(
		metrics.confusion_matrix,
		arr2(&[[5, 3, 0], [2, 3, 1], [0, 2, 11]])
	);
	assert_close(metrics.accuracy, 0.7037037);
	assert_close(metrics.error_rate, 1.0 - 0.7037037);
	let rabbit = &metrics.class_metrics[2];
	assert_eq!(rabbit.true_positives, 11);
	assert_close(rabbit.precision, 0.9166667);
	assert_close(rabbit.recall, 0.84615386);
	assert_close(rabbit.f1_score, 0.88);
	assert_close(rabbit.false_positive_rate, 1.0 / 14.0);
	assert_close(metrics.weighted_average.precision, 0.7363316);
	assert_close(metrics.weighted_average.recall, 0.7037037);
	// with one hot predictions the ROC area is the mean of the true positive rate and the true negative rate
	assert_close(rabbit.auc_roc, (11.0 / 13.0 + 13.0 / 14.0) / 2.0);
	let chance = (8.0 * 7.0 + 6.0 * 8.0 + 13.0 * 12.0) / (27.0 * 27.0);
	assert_close(metrics.kappa, (19.0 / 27.0 - chance) / (1.0 - chance));
}

#[test]
fn test_accuracy_matches_diagonal() {
	let labels = [0, 1, 2, 2, 1, 0, 0];
	let predictions = [0, 2, 2, 1, 1, 0, 1];
	let metrics = evaluate(3, &labels, &predictions);
	let diagonal: u64 = metrics.confusion_matrix.diag().sum();
	let total: u64 = metrics.confusion_matrix.sum();
	assert_close(metrics.accuracy, diagonal as f32 / total as f32);
	for (class_index, row) in metrics.confusion_matrix.genrows().into_iter().enumerate() {
		let expected = labels.iter().filter(|label| **label == class_index).count() as u64;
		assert_eq!(row.sum(), expected);
	}
}

#[test]
fn test_relative_errors() {
	// The prior from balanced training weights is uniform, so predicting it has 100% relative error.
	let mut metrics = ClassificationMetrics::new(2, &[3.0, 3.0]);
	for label in [0, 1, 1].iter() {
		metrics.update(ClassificationMetricsInput {
			probabilities: arr1(&[0.5, 0.5]).view(),
			label: Some(*label),
		});
	}
	let metrics = metrics.finalize();
	assert_close(metrics.relative_absolute_error, 100.0);
	assert_close(metrics.root_relative_squared_error, 100.0);
	assert_close(metrics.mean_absolute_error, 0.5);
}

#[test]
fn test_ignored_and_empty() {
	let mut metrics = ClassificationMetrics::new(2, &[]);
	metrics.update(ClassificationMetricsInput {
		probabilities: arr1(&[0.2, 0.8]).view(),
		label: None,
	});
	let metrics = metrics.finalize();
	assert_eq!(metrics.n_ignored, 1);
	assert_eq!(metrics.n_examples, 0);
	assert_eq!(metrics.accuracy, None);
	assert_eq!(metrics.kappa, None);
	assert_eq!(metrics.mean_absolute_error, None);
	assert_eq!(metrics.relative_absolute_error, None);
	assert_eq!(metrics.class_metrics[0].precision, None);
	assert_eq!(metrics.class_metrics[0].auc_roc, None);
	assert_eq!(metrics.weighted_average.recall, None);
}

#[test]
fn test_merge() {
	let mut a = ClassificationMetrics::new(2, &[1.0, 1.0]);
	let mut b = a.clone();
	a.update(ClassificationMetricsInput {
		probabilities: arr1(&[0.9, 0.1]).view(),
		label: Some(0),
	});
	b.update(ClassificationMetricsInput {
		probabilities: arr1(&[0.4, 0.6]).view(),
		label: Some(0),
	});
	a.merge(b);
	let metrics = a.finalize();
	assert_eq!(metrics.confusion_matrix, arr2(&[[1, 1], [0, 0]]));
	assert_eq!(metrics.class_metrics[1].true_positive_rate, None);
}

#[test]
fn test_argmax_ties_go_to_lowest_index() {
	assert_eq!(argmax(arr1(&[0.25, 0.5, 0.5]).view()), 1);
	assert_eq!(argmax(arr1(&[0.0, 0.0]).view()), 0);
}

#[test]
fn test_roc_area_ranks_probabilities() {
	let mut metrics = ClassificationMetrics::new(2, &[1.0, 1.0]);
	for (probability, label) in [(0.9f32, 0), (0.4, 0), (0.6, 1), (0.1, 1)].iter() {
		let probabilities = arr1(&[*probability, 1.0 - probability]);
		metrics.update(ClassificationMetricsInput {
			probabilities: probabilities.view(),
			label: Some(*label),
		});
	}
	let metrics = metrics.finalize();
	assert_eq!(metrics.confusion_matrix, arr2(&[[1, 1], [1, 1]]));
	// three of the four positive and negative pairs are ranked correctly
	assert_close(metrics.class_metrics[0].auc_roc, 0.75);
	assert_close(metrics.class_metrics[1].auc_roc, 0.75);
	assert_close(metrics.weighted_average.auc_roc, 0.75);
}
