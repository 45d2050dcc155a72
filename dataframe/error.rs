use std::path::PathBuf;
use thiserror::Error;

/// The ways loading a dataset can fail.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("failed to read \"{}\"", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse the delimited file")]
	Csv(#[from] csv::Error),
	#[error("malformed arff file at line {line}: {message}")]
	Arff { line: usize, message: String },
	#[error("the dataset has no columns")]
	NoColumns,
	#[error("the dataset has no rows")]
	Empty,
	#[error("did not find target column \"{target}\" among column names \"{column_names}\"")]
	TargetNotFound {
		target: String,
		column_names: String,
	},
}

impl LoadError {
	pub(crate) fn arff(line: usize, message: impl Into<String>) -> Self {
		LoadError::Arff {
			line,
			message: message.into(),
		}
	}
}
