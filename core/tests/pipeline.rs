use ndarray::prelude::*;
use std::io::Write;
use suinz_core::{
	respond, run, Algorithm, Config, PipelineError, Response, SplitRatio, TrainRequest,
};
use tempfile::NamedTempFile;

const WEATHER: &str = "% the classic weather dataset
@relation weather
@attribute outlook {sunny, overcast, rainy}
@attribute temperature numeric
@attribute humidity numeric
@attribute windy {TRUE, FALSE}
@attribute play {yes, no}
@data
sunny,85,85,FALSE,no
sunny,80,90,TRUE,no
overcast,83,86,FALSE,yes
rainy,70,96,FALSE,yes
rainy,68,80,FALSE,yes
rainy,65,70,TRUE,no
overcast,64,65,TRUE,yes
sunny,72,95,FALSE,no
sunny,69,?,FALSE,yes
rainy,75,80,FALSE,yes
sunny,75,70,TRUE,yes
overcast,72,90,TRUE,yes
overcast,81,75,FALSE,yes
rainy,71,91,TRUE,no
";

fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
	let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file
}

fn csv(n_rows: usize) -> String {
	let mut contents = "x,color,class\n".to_owned();
	for i in 0..n_rows {
		let color = if i % 2 == 0 { "red" } else { "blue" };
		let class = if i % 3 == 0 { "a" } else { "b" };
		contents.push_str(&format!("{},{},{}\n", i, color, class));
	}
	contents
}

fn request(file: &NamedTempFile, algorithm: Algorithm, split: f64) -> TrainRequest {
	TrainRequest {
		file_path: Some(file.path().to_owned()),
		algorithm: algorithm.name().to_owned(),
		split: SplitRatio::new(split).unwrap(),
	}
}

#[test]
fn test_every_algorithm() {
	let file = write_file(".arff", WEATHER);
	for algorithm in Algorithm::all() {
		let report = run(&request(&file, algorithm, 0.7), &Config::default())
			.unwrap_or_else(|error| panic!("{} failed: {}", algorithm, error.chain()));
		assert_eq!(report.algorithm, algorithm);
		assert_eq!(report.train_size, 10);
		assert_eq!(report.test_size, 4);
		assert_eq!(report.classes, vec!["yes".to_owned(), "no".to_owned()]);
		let metrics = &report.metrics;
		assert_eq!(metrics.confusion_matrix.dim(), (2, 2));
		// the last four rows are yes, yes, yes, no
		assert_eq!(metrics.confusion_matrix.sum_axis(Axis(1)), arr1(&[3, 1]));
		assert_eq!(metrics.n_examples, 4);
		let n_correct: u64 = metrics.confusion_matrix.diag().sum();
		assert_eq!(metrics.n_correct, n_correct);
		let accuracy = metrics.accuracy.unwrap();
		assert!((accuracy - n_correct as f32 / 4.0).abs() < 1e-6);
		assert!(report.to_string().starts_with("=== Training Completed ===\n"));
	}
}

#[test]
fn test_every_algorithm_with_consecutive_float_values() {
	// x holds two consecutive floats that alone decide the class, y holds runs of tied values.
	let mut contents = "x,y,class\n".to_owned();
	for i in 0..20 {
		let (x, class) = if i % 2 == 0 {
			("-0.4", "a")
		} else {
			("-0.39999998", "b")
		};
		contents.push_str(&format!("{},{},{}\n", x, i / 5, class));
	}
	let file = write_file(".csv", &contents);
	for algorithm in Algorithm::all() {
		let report = run(&request(&file, algorithm, 0.7), &Config::default())
			.unwrap_or_else(|error| panic!("{} failed: {}", algorithm, error.chain()));
		assert_eq!((report.train_size, report.test_size), (14, 6));
		let metrics = &report.metrics;
		assert_eq!(metrics.n_examples, 6);
		assert_eq!(metrics.confusion_matrix.sum_axis(Axis(1)), arr1(&[3, 3]));
		assert_eq!(metrics.n_correct + metrics.n_incorrect, 6);
	}
	let report = run(&request(&file, Algorithm::J48, 0.7), &Config::default()).unwrap();
	assert_eq!(report.metrics.n_correct, 6);
}

#[test]
fn test_split_sizes() {
	let file = write_file(".csv", &csv(100));
	let report = run(&request(&file, Algorithm::ZeroR, 0.7), &Config::default()).unwrap();
	assert_eq!((report.train_size, report.test_size), (70, 30));
	let report = run(&request(&file, Algorithm::OneR, 0.6), &Config::default()).unwrap();
	assert_eq!((report.train_size, report.test_size), (60, 40));
	assert_eq!(
		report.metrics.confusion_matrix.sum(),
		report.metrics.n_examples
	);
}

#[test]
fn test_empty_test_set() {
	let file = write_file(".csv", &csv(1));
	let report = run(&request(&file, Algorithm::ZeroR, 0.9), &Config::default()).unwrap();
	assert_eq!((report.train_size, report.test_size), (1, 0));
	assert_eq!(report.metrics.accuracy, None);
	assert!(report.to_string().contains("N/A"));

	let file = write_file(".csv", &csv(5));
	let report = run(&request(&file, Algorithm::J48, 0.9), &Config::default()).unwrap();
	assert_eq!((report.train_size, report.test_size), (5, 0));
	assert_eq!(report.metrics.n_examples, 0);
	assert_eq!(report.metrics.kappa, None);
}

#[test]
fn test_empty_training_set() {
	let file = write_file(".csv", &csv(1));
	let result = run(&request(&file, Algorithm::ZeroR, 0.1), &Config::default());
	assert!(matches!(result, Err(PipelineError::InsufficientData(_))));
}

#[test]
fn test_unknown_algorithm() {
	let file = write_file(".arff", WEATHER);
	let request = TrainRequest {
		file_path: Some(file.path().to_owned()),
		algorithm: "Deep Belief Network".to_owned(),
		split: SplitRatio::default(),
	};
	let result = run(&request, &Config::default());
	assert!(matches!(result, Err(PipelineError::UnknownAlgorithm(_))));
	let text = respond(&request, &Config::default()).to_string();
	assert_eq!(
		text,
		"❌ ERROR during algorithm selection:\n\nfailed to select the algorithm: unknown algorithm \"Deep Belief Network\""
	);
}

#[test]
fn test_missing_file() {
	let request = TrainRequest {
		file_path: Some("/nonexistent/weather.arff".into()),
		..Default::default()
	};
	let response = respond(&request, &Config::default());
	assert!(matches!(response, Response::Error(PipelineError::Load(_))));
	assert!(response.to_string().starts_with("❌ ERROR during loading:"));
}

#[test]
fn test_numeric_class() {
	let file = write_file(".arff", "@relation r\n@attribute x numeric\n@attribute y numeric\n@data\n1,2\n3,4\n");
	let result = run(&request(&file, Algorithm::NaiveBayes, 0.5), &Config::default());
	assert!(matches!(result, Err(PipelineError::Training(_))));
}

#[test]
fn test_target_column_from_config() {
	let file = write_file(".arff", WEATHER);
	let config = Config {
		target_column: Some("outlook".to_owned()),
		..Default::default()
	};
	let report = run(&request(&file, Algorithm::NaiveBayes, 0.7), &config).unwrap();
	assert_eq!(report.metrics.confusion_matrix.dim(), (3, 3));
	assert_eq!(report.classes[1], "overcast");
}

#[test]
fn test_runs_are_repeatable() {
	let file = write_file(".arff", WEATHER);
	for algorithm in &[
		Algorithm::RandomForest,
		Algorithm::RandomCommittee,
		Algorithm::Bagging,
		Algorithm::JRip,
	] {
		let a = run(&request(&file, *algorithm, 0.5), &Config::default()).unwrap();
		let b = run(&request(&file, *algorithm, 0.5), &Config::default()).unwrap();
		assert_eq!(a.metrics.confusion_matrix, b.metrics.confusion_matrix);
		assert_eq!(a.metrics, b.metrics);
	}
}
