use thiserror::Error;

/// The ways training a model can fail.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrainError {
	#[error("cannot handle string attribute \"{0}\"")]
	UnsupportedAttribute(String),
	#[error("cannot handle numeric class \"{0}\"")]
	NumericClass(String),
	#[error("the class \"{0}\" has no values")]
	NoClasses(String),
	#[error("there are no training instances with a known class")]
	NoInstances,
	#[error("training did not converge: {0}")]
	NotConverged(String),
	#[error("a member model failed to classify its training data: {0}")]
	Member(String),
}

/// The ways computing a prediction can fail.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PredictError {
	#[error("expected {expected} attribute values but the example has {actual}")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("failed to train the local model")]
	Train(#[from] TrainError),
}
