/*!
This module defines the [`Report`](struct.Report.html) produced by a successful pipeline run and renders it as text.
*/

use crate::{
	registry::{Algorithm, Family},
	split::SplitRatio,
};
use ndarray::prelude::*;
use suinz_metrics::ClassificationMetricsOutput;
use suinz_util::table::{Alignment, Table};

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
	pub algorithm: Algorithm,
	pub family: Family,
	pub split: SplitRatio,
	pub train_size: usize,
	pub test_size: usize,
	/// Wall clock time spent fitting the model, not loading or evaluating.
	pub training_time_ms: u128,
	pub metrics: ClassificationMetricsOutput,
	/// The class names in the order of the confusion matrix rows.
	pub classes: Vec<String>,
	/// The name of the dataset, which is the file stem.
	pub relation: String,
}

impl std::fmt::Display for Report {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "=== Training Completed ===")?;
		writeln!(f, "Algorithm: {}", self.algorithm)?;
		writeln!(f, "Training Split: {}", self.split)?;
		writeln!(f, "Time: {} ms", self.training_time_ms)?;
		writeln!(f)?;
		writeln!(f, "=== Summary ===")?;
		write!(f, "{}", self.summary())?;
		writeln!(f)?;
		writeln!(f, "=== Detailed Accuracy By Class ===")?;
		write!(f, "{}", self.class_details())?;
		writeln!(f)?;
		writeln!(f, "=== Confusion Matrix ===")?;
		write!(f, "{}", self.confusion_matrix())?;
		Ok(())
	}
}

impl Report {
	fn summary(&self) -> String {
		let metrics = &self.metrics;
		let rows = vec![
			[
				"Correctly Classified Instances".to_owned(),
				metrics.n_correct.to_string(),
				percent(metrics.accuracy.map(|accuracy| 100.0 * accuracy)),
			],
			[
				"Incorrectly Classified Instances".to_owned(),
				metrics.n_incorrect.to_string(),
				percent(metrics.error_rate.map(|error_rate| 100.0 * error_rate)),
			],
			[
				"Kappa statistic".to_owned(),
				number(metrics.kappa, 4),
				String::new(),
			],
			[
				"Mean absolute error".to_owned(),
				number(metrics.mean_absolute_error, 4),
				String::new(),
			],
			[
				"Root mean squared error".to_owned(),
				number(metrics.root_mean_squared_error, 4),
				String::new(),
			],
			[
				"Relative absolute error".to_owned(),
				String::new(),
				percent(metrics.relative_absolute_error),
			],
			[
				"Root relative squared error".to_owned(),
				String::new(),
				percent(metrics.root_relative_squared_error),
			],
			[
				"Ignored Class Unknown Instances".to_owned(),
				metrics.n_ignored.to_string(),
				String::new(),
			],
			[
				"Total Number of Instances".to_owned(),
				metrics.n_examples.to_string(),
				String::new(),
			],
		];
		let values = to_array(rows);
		Table::new()
			.values(values.view())
			.alignments(&[Alignment::Left, Alignment::Right, Alignment::Right])
			.to_string()
	}

	fn class_details(&self) -> String {
		let header: Vec<String> = [
			"TP Rate",
			"FP Rate",
			"Precision",
			"Recall",
			"F-Measure",
			"MCC",
			"ROC Area",
			"Class",
		]
		.iter()
		.map(|title| title.to_string())
		.collect();
		let mut rows: Vec<[String; 8]> = self
			.metrics
			.class_metrics
			.iter()
			.zip(self.classes.iter())
			.map(|(class_metrics, class)| {
				[
					number(class_metrics.true_positive_rate, 3),
					number(class_metrics.false_positive_rate, 3),
					number(class_metrics.precision, 3),
					number(class_metrics.recall, 3),
					number(class_metrics.f1_score, 3),
					number(class_metrics.matthews_correlation_coefficient, 3),
					number(class_metrics.auc_roc, 3),
					class.clone(),
				]
			})
			.collect();
		let average = &self.metrics.weighted_average;
		rows.push([
			number(average.true_positive_rate, 3),
			number(average.false_positive_rate, 3),
			number(average.precision, 3),
			number(average.recall, 3),
			number(average.f1_score, 3),
			number(average.matthews_correlation_coefficient, 3),
			number(average.auc_roc, 3),
			"Weighted Avg.".to_owned(),
		]);
		let values = to_array(rows);
		let mut alignments = vec![Alignment::Right; 7];
		alignments.push(Alignment::Left);
		Table::new()
			.header(&header)
			.values(values.view())
			.alignments(&alignments)
			.to_string()
	}

	/// Render the confusion matrix with a letter for each class, actual classes in rows.
	fn confusion_matrix(&self) -> String {
		let confusion_matrix = &self.metrics.confusion_matrix;
		let letters: Vec<String> = (0..confusion_matrix.nrows()).map(class_letter).collect();
		let width = confusion_matrix
			.iter()
			.map(|count| count.to_string().len())
			.chain(letters.iter().map(|letter| letter.len()))
			.max()
			.unwrap_or(1);
		let mut text = String::new();
		for letter in letters.iter() {
			text.push_str(&format!(" {:>width$}", letter, width = width));
		}
		text.push_str("   <-- classified as\n");
		for (class_index, row) in confusion_matrix.genrows().into_iter().enumerate() {
			for count in row.iter() {
				text.push_str(&format!(" {:>width$}", count, width = width));
			}
			let class = self
				.classes
				.get(class_index)
				.map(|class| class.as_str())
				.unwrap_or("");
			text.push_str(&format!(
				" | {:>width$} = {}\n",
				letters[class_index],
				class,
				width = width
			));
		}
		text
	}
}

/// Name the classes a, b, ..., z, aa, ab, ... in order.
fn class_letter(mut index: usize) -> String {
	let mut letters = Vec::new();
	loop {
		letters.push(b'a' + (index % 26) as u8);
		if index < 26 {
			break;
		}
		index = index / 26 - 1;
	}
	letters.iter().rev().map(|letter| *letter as char).collect()
}

fn number(value: Option<f32>, precision: usize) -> String {
	match value {
		Some(value) => format!("{:.*}", precision, value),
		None => "N/A".to_owned(),
	}
}

fn percent(value: Option<f32>) -> String {
	match value {
		Some(value) => format!("{:.4} %", value),
		None => "N/A".to_owned(),
	}
}

fn to_array<const N: usize>(rows: Vec<[String; N]>) -> Array2<String> {
	let n_rows = rows.len();
	let cells: Vec<String> = rows.into_iter().flat_map(|row| row.to_vec()).collect();
	Array2::from_shape_vec((n_rows, N), cells).unwrap_or_else(|_| Array2::default((0, N)))
}

#[cfg(test)]
mod test {
	use super::*;
	use suinz_metrics::{AverageClassMetrics, ClassMetrics};

	fn class_metrics(counts: [u64; 4], rates: [f32; 7]) -> ClassMetrics {
		ClassMetrics {
			true_positives: counts[0],
			false_positives: counts[1],
			true_negatives: counts[2],
			false_negatives: counts[3],
			true_positive_rate: Some(rates[0]),
			false_positive_rate: Some(rates[1]),
			precision: Some(rates[2]),
			recall: Some(rates[3]),
			f1_score: Some(rates[4]),
			matthews_correlation_coefficient: Some(rates[5]),
			auc_roc: Some(rates[6]),
		}
	}

	fn report() -> Report {
		let metrics = ClassificationMetricsOutput {
			confusion_matrix: arr2(&[[3, 1], [0, 2]]),
			n_examples: 6,
			n_correct: 5,
			n_incorrect: 1,
			n_ignored: 0,
			accuracy: Some(5.0 / 6.0),
			error_rate: Some(1.0 / 6.0),
			kappa: Some(2.0 / 3.0),
			mean_absolute_error: Some(0.25),
			root_mean_squared_error: Some(0.4),
			relative_absolute_error: Some(50.0),
			root_relative_squared_error: Some(80.0),
			class_metrics: vec![
				class_metrics([3, 0, 2, 1], [0.75, 0.0, 1.0, 0.75, 6.0 / 7.0, 0.70710677, 0.9]),
				class_metrics([2, 1, 3, 0], [1.0, 0.25, 2.0 / 3.0, 1.0, 0.8, 0.70710677, 0.9]),
			],
			weighted_average: AverageClassMetrics {
				true_positive_rate: Some(5.0 / 6.0),
				false_positive_rate: Some(1.0 / 12.0),
				precision: Some(8.0 / 9.0),
				recall: Some(5.0 / 6.0),
				f1_score: Some(0.8380952),
				matthews_correlation_coefficient: Some(0.70710677),
				auc_roc: Some(0.9),
			},
		};
		Report {
			algorithm: Algorithm::J48,
			family: Family::Trees,
			split: SplitRatio::default(),
			train_size: 14,
			test_size: 6,
			training_time_ms: 12,
			metrics,
			classes: vec!["yes".to_owned(), "no".to_owned()],
			relation: "weather".to_owned(),
		}
	}

	#[test]
	fn test_report() {
		insta::assert_snapshot!(report().to_string(), @r###"
 === Training Completed ===
 Algorithm: J48 (Decision Tree)
 Training Split: 70% Train / 30% Test
 Time: 12 ms

 === Summary ===
 | Correctly Classified Instances   |      5 | 83.3333 % |
 | Incorrectly Classified Instances |      1 | 16.6667 % |
 | Kappa statistic                  | 0.6667 |           |
 | Mean absolute error              | 0.2500 |           |
 | Root mean squared error          | 0.4000 |           |
 | Relative absolute error          |        | 50.0000 % |
 | Root relative squared error      |        | 80.0000 % |
 | Ignored Class Unknown Instances  |      0 |           |
 | Total Number of Instances        |      6 |           |

 === Detailed Accuracy By Class ===
 | TP Rate | FP Rate | Precision | Recall | F-Measure |   MCC | ROC Area | Class         |
 |---------|---------|-----------|--------|-----------|-------|----------|---------------|
 |   0.750 |   0.000 |     1.000 |  0.750 |     0.857 | 0.707 |    0.900 | yes           |
 |   1.000 |   0.250 |     0.667 |  1.000 |     0.800 | 0.707 |    0.900 | no            |
 |   0.833 |   0.083 |     0.889 |  0.833 |     0.838 | 0.707 |    0.900 | Weighted Avg. |

 === Confusion Matrix ===
  a b   <-- classified as
  3 1 | a = yes
  0 2 | b = no
 "###);
	}

	#[test]
	fn test_missing_metrics_render_as_not_available() {
		let mut report = report();
		report.metrics.accuracy = None;
		report.metrics.kappa = None;
		report.metrics.class_metrics[0].precision = None;
		let text = report.to_string();
		assert!(text.contains("| Correctly Classified Instances   |      5 |       N/A |"));
		assert!(text.contains("| Kappa statistic                  |    N/A |"));
		assert!(text.contains("|   0.750 |   0.000 |       N/A |"));
	}

	#[test]
	fn test_class_letters() {
		assert_eq!(class_letter(0), "a");
		assert_eq!(class_letter(25), "z");
		assert_eq!(class_letter(26), "aa");
		assert_eq!(class_letter(27), "ab");
		assert_eq!(class_letter(52), "ba");
	}

	#[test]
	fn test_wide_confusion_matrix() {
		let mut report = report();
		report.metrics.confusion_matrix = arr2(&[[50, 0], [3, 47]]);
		let text = report.confusion_matrix();
		assert_eq!(
			text,
			"  a  b   <-- classified as\n 50  0 |  a = yes\n  3 47 |  b = no\n"
		);
	}
}
