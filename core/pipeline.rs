/*!
This module runs the whole pipeline: load a dataset, train the chosen algorithm on the first part of its rows, and evaluate the model on the rest.
*/

use crate::{
	config::Config,
	error::{EvaluationError, PipelineError},
	registry::Algorithm,
	report::Report,
	split::{SplitPlan, SplitRatio},
};
use ndarray::prelude::*;
use std::{
	path::{Path, PathBuf},
	time::Instant,
};
use suinz_dataframe::{DataFrame, InferOptions, LoadOptions};
use suinz_metrics::{ClassificationMetrics, ClassificationMetricsInput, StreamingMetric};
use suinz_model::{Encoded, Model, Schema};
use tracing::{debug, info, warn};

/// A request to train and evaluate one algorithm on one dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainRequest {
	pub file_path: Option<PathBuf>,
	/// The display name of the algorithm, as listed by [`Algorithm::all`](../registry/enum.Algorithm.html#method.all).
	pub algorithm: String,
	pub split: SplitRatio,
}

impl Default for TrainRequest {
	fn default() -> Self {
		Self {
			file_path: None,
			algorithm: Algorithm::J48.name().to_owned(),
			split: SplitRatio::default(),
		}
	}
}

/// The text to show for a request. Its `Display` output is the full message.
#[derive(Debug)]
pub enum Response {
	Report(Report),
	Warning(String),
	Error(PipelineError),
}

impl Response {
	pub fn is_success(&self) -> bool {
		matches!(self, Response::Report(_))
	}
}

impl std::fmt::Display for Response {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Response::Report(report) => write!(f, "{}", report),
			Response::Warning(message) => write!(f, "⚠ {}", message),
			Response::Error(error) => write!(f, "❌ ERROR during {}:\n\n{}", error.step(), error.chain()),
		}
	}
}

/// Run the pipeline and turn its result into a response.
pub fn respond(request: &TrainRequest, config: &Config) -> Response {
	match run(request, config) {
		Ok(report) => Response::Report(report),
		Err(PipelineError::NoFileSelected) => {
			Response::Warning("No dataset selected.\nPlease import a dataset first.".to_owned())
		}
		Err(error) => Response::Error(error),
	}
}

/// Load the dataset, train the requested algorithm on the first rows, and evaluate it on the remaining rows.
pub fn run(request: &TrainRequest, config: &Config) -> Result<Report, PipelineError> {
	let file_path = request
		.file_path
		.as_deref()
		.ok_or(PipelineError::NoFileSelected)?;
	let _span = tracing::info_span!("run", algorithm = %request.algorithm).entered();

	// Load the dataset.
	let options = LoadOptions {
		target_column: config.target_column.clone(),
		infer_options: InferOptions {
			enum_max_unique_values: config.enum_max_unique_values,
		},
		..Default::default()
	};
	let dataframe = DataFrame::from_path(file_path, &options).map_err(PipelineError::Load)?;
	let relation = relation(file_path);
	info!(
		relation = %relation,
		n_rows = dataframe.nrows(),
		n_columns = dataframe.ncols(),
		"loaded dataset"
	);

	// Resolve the algorithm before doing any training work.
	let algorithm =
		Algorithm::from_name(&request.algorithm).map_err(PipelineError::UnknownAlgorithm)?;

	// Split the rows in file order.
	let plan = SplitPlan::new(dataframe.nrows(), request.split);
	if plan.train_size == 0 {
		return Err(PipelineError::InsufficientData(format!(
			"a split of {} leaves no training rows out of {}",
			request.split,
			dataframe.nrows()
		)));
	}
	let view = dataframe.view();
	let (train, test) = view.split_at_row(plan.train_size);
	info!(
		train_size = plan.train_size,
		test_size = plan.test_size,
		"split dataset"
	);

	// Train.
	let schema = Schema::from_dataframe(&train).map_err(PipelineError::Training)?;
	let instances = schema.instances(&train);
	if instances.is_empty() {
		return Err(PipelineError::InsufficientData(format!(
			"none of the {} training rows has a value for the class \"{}\"",
			plan.train_size, schema.class_name
		)));
	}
	let learner = algorithm.learner();
	debug!(learner = ?learner, n_attributes = instances.n_attributes(), "training");
	let start = Instant::now();
	let model = learner
		.train(&instances, config.seed)
		.map_err(PipelineError::Training)?;
	let training_time_ms = start.elapsed().as_millis();
	info!(training_time_ms = %training_time_ms, "trained model");

	// Evaluate.
	let training_class_weights: Vec<f32> = instances
		.class_weights()
		.into_iter()
		.map(|weight| weight as f32)
		.collect();
	let encoded = schema.encode(&test);
	let metrics = evaluate(
		model.as_ref(),
		&encoded,
		schema.classes.len(),
		&training_class_weights,
	)?;
	if metrics.n_ignored > 0 {
		warn!(n_ignored = metrics.n_ignored, "ignored test rows with a missing class");
	}
	info!(
		n_examples = metrics.n_examples,
		n_correct = metrics.n_correct,
		"evaluated model"
	);

	Ok(Report {
		algorithm,
		family: algorithm.family(),
		split: request.split,
		train_size: plan.train_size,
		test_size: plan.test_size,
		training_time_ms,
		metrics,
		classes: schema.classes.clone(),
		relation,
	})
}

/// Classify every encoded example with a known class and aggregate the metrics. Examples with a missing class are counted as ignored without being classified.
fn evaluate(
	model: &dyn Model,
	encoded: &Encoded,
	n_classes: usize,
	training_class_weights: &[f32],
) -> Result<suinz_metrics::ClassificationMetricsOutput, PipelineError> {
	let mut metrics = ClassificationMetrics::new(n_classes, training_class_weights);
	let empty = Array1::<f32>::zeros(0);
	for (row, (example, label)) in encoded
		.features
		.genrows()
		.into_iter()
		.zip(encoded.labels.iter())
		.enumerate()
	{
		if label.is_none() {
			metrics.update(ClassificationMetricsInput {
				probabilities: empty.view(),
				label: None,
			});
			continue;
		}
		let probabilities = model
			.distribution(example)
			.map_err(|error| PipelineError::Evaluation {
				row,
				source: EvaluationError::Predict(error),
			})?;
		check_distribution(probabilities.view(), n_classes)
			.map_err(|source| PipelineError::Evaluation { row, source })?;
		metrics.update(ClassificationMetricsInput {
			probabilities: probabilities.view(),
			label: *label,
		});
	}
	Ok(metrics.finalize())
}

fn check_distribution(probabilities: ArrayView1<f32>, n_classes: usize) -> Result<(), EvaluationError> {
	if probabilities.len() != n_classes {
		return Err(EvaluationError::WrongLength {
			expected: n_classes,
			actual: probabilities.len(),
		});
	}
	if probabilities.iter().any(|probability| !probability.is_finite()) {
		return Err(EvaluationError::NotFinite);
	}
	Ok(())
}

fn relation(file_path: &Path) -> String {
	file_path
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default()
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_model::PredictError;

	#[derive(Debug)]
	struct Broken(Array1<f32>);

	impl Model for Broken {
		fn distribution(&self, _example: ArrayView1<f32>) -> Result<Array1<f32>, PredictError> {
			Ok(self.0.clone())
		}
	}

	fn encoded() -> Encoded {
		Encoded {
			features: arr2(&[[0.0], [1.0], [2.0]]),
			labels: vec![Some(0), None, Some(1)],
		}
	}

	#[test]
	fn test_evaluate_ignores_missing_classes() {
		let model = Broken(arr1(&[0.75, 0.25]));
		let metrics = evaluate(&model, &encoded(), 2, &[1.0, 1.0]).unwrap();
		assert_eq!(metrics.n_ignored, 1);
		assert_eq!(metrics.confusion_matrix, arr2(&[[1, 0], [1, 0]]));
	}

	#[test]
	fn test_evaluate_rejects_bad_distributions() {
		let model = Broken(arr1(&[1.0]));
		match evaluate(&model, &encoded(), 2, &[1.0, 1.0]) {
			Err(PipelineError::Evaluation { row: 0, source }) => assert_eq!(
				source,
				EvaluationError::WrongLength {
					expected: 2,
					actual: 1
				}
			),
			result => panic!("unexpected result {:?}", result),
		}
		let model = Broken(arr1(&[std::f32::NAN, 0.5]));
		match evaluate(&model, &encoded(), 2, &[1.0, 1.0]) {
			Err(PipelineError::Evaluation { source, .. }) => {
				assert_eq!(source, EvaluationError::NotFinite)
			}
			result => panic!("unexpected result {:?}", result),
		}
	}

	#[test]
	fn test_no_file_is_a_warning() {
		let response = respond(&TrainRequest::default(), &Config::default());
		assert_eq!(
			response.to_string(),
			"⚠ No dataset selected.\nPlease import a dataset first."
		);
		assert!(!response.is_success());
	}

	#[test]
	fn test_relation() {
		assert_eq!(relation(Path::new("/data/iris.arff")), "iris");
	}
}
