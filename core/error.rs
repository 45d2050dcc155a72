use crate::registry::UnknownAlgorithmError;
use suinz_dataframe::LoadError;
use suinz_model::{PredictError, TrainError};
use thiserror::Error;

/// The ways a pipeline run can fail. There is one variant for each step, carrying the step's error.
#[derive(Debug, Error)]
pub enum PipelineError {
	#[error("no dataset selected")]
	NoFileSelected,
	#[error("failed to load the dataset")]
	Load(#[source] LoadError),
	#[error("failed to select the algorithm")]
	UnknownAlgorithm(#[source] UnknownAlgorithmError),
	#[error("not enough data to train: {0}")]
	InsufficientData(String),
	#[error("failed to train the model")]
	Training(#[source] TrainError),
	#[error("failed to evaluate the model on row {row}")]
	Evaluation {
		row: usize,
		#[source]
		source: EvaluationError,
	},
}

#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
	#[error(transparent)]
	Predict(#[from] PredictError),
	#[error("expected a distribution over {expected} classes but got {actual} values")]
	WrongLength { expected: usize, actual: usize },
	#[error("the predicted distribution is not finite")]
	NotFinite,
}

impl PipelineError {
	/// The name of the step that failed, as it appears in error messages.
	pub fn step(&self) -> &'static str {
		match self {
			PipelineError::NoFileSelected | PipelineError::Load(_) => "loading",
			PipelineError::UnknownAlgorithm(_) => "algorithm selection",
			PipelineError::InsufficientData(_) => "splitting",
			PipelineError::Training(_) => "training",
			PipelineError::Evaluation { .. } => "evaluation",
		}
	}

	/// This error and its sources joined into one line.
	pub fn chain(&self) -> String {
		let mut message = self.to_string();
		let mut source = std::error::Error::source(self);
		while let Some(error) = source {
			message.push_str(": ");
			message.push_str(&error.to_string());
			source = error.source();
		}
		message
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_chain() {
		let error = PipelineError::Training(TrainError::NumericClass("price".to_owned()));
		assert_eq!(error.step(), "training");
		assert_eq!(
			error.chain(),
			"failed to train the model: cannot handle numeric class \"price\""
		);
		let error = PipelineError::Evaluation {
			row: 3,
			source: EvaluationError::Predict(PredictError::Train(TrainError::NoInstances)),
		};
		assert_eq!(
			error.chain(),
			"failed to evaluate the model on row 3: failed to train the local model: there are no training instances with a known class"
		);
	}
}
