use std::cmp::Ordering;

/// This function computes the area under the receiver operating characteristic curve using the trapezoid method. The area is undefined, and `None` is returned, if there are no positive or no negative examples.
pub fn auc_roc(probabilities: &[f32], positives: &[bool]) -> Option<f32> {
	let roc_curve = compute_roc_curve(probabilities, positives)?;
	// compute the riemann sum of the roc curve
	let auc = roc_curve
		.windows(2)
		.map(|window| {
			let left = &window[0];
			let right = &window[1];
			let y_average = (left.true_positive_rate + right.true_positive_rate) / 2.0;
			let dx = right.false_positive_rate - left.false_positive_rate;
			y_average * dx
		})
		.sum();
	Some(auc)
}

#[derive(Debug, PartialEq)]
pub struct ROCCurvePoint {
	/// The classification threshold.
	pub threshold: f32,
	/// The true positive rate for all predictions with probability >= threshold.
	pub true_positive_rate: f32,
	/// The false positive rate for all predictions with probability >= threshold.
	pub false_positive_rate: f32,
}

/// This function computes the ROC curve. The ROC curve plots the false positive rate on the x axis and the true positive rate on the y axis for various classification thresholds.
pub fn compute_roc_curve(probabilities: &[f32], positives: &[bool]) -> Option<Vec<ROCCurvePoint>> {
	let count_positives = positives.iter().filter(|positive| **positive).count();
	let count_negatives = positives.len() - count_positives;
	if count_positives == 0 || count_negatives == 0 {
		return None;
	}
	let mut tps_fps = compute_tps_fps_by_threshold(probabilities, positives);
	for i in 1..tps_fps.len() {
		tps_fps[i].true_positives += tps_fps[i - 1].true_positives;
		tps_fps[i].false_positives += tps_fps[i - 1].false_positives;
	}
	// add a point at (0,0) on the roc curve with a dummy threshold of 1.0
	let mut roc_curve = vec![ROCCurvePoint {
		threshold: 1.0,
		true_positive_rate: 0.0,
		false_positive_rate: 0.0,
	}];
	roc_curve.extend(tps_fps.iter().map(|point| ROCCurvePoint {
		threshold: point.threshold,
		true_positive_rate: point.true_positives as f32 / count_positives as f32,
		false_positive_rate: point.false_positives as f32 / count_negatives as f32,
	}));
	Some(roc_curve)
}

#[derive(Debug)]
struct TpsFpsPoint {
	/// The classification threshold.
	threshold: f32,
	/// The true positives for this threshold.
	true_positives: usize,
	/// The false positives for this threshold.
	false_positives: usize,
}

/**
This function computes the counts of true positives and false positives at each classification threshold. Unlike the roc curve, each point contains just the count of true positives and false positives at this threshold instead of all values greater than or equal to this threshold.
*/
fn compute_tps_fps_by_threshold(probabilities: &[f32], positives: &[bool]) -> Vec<TpsFpsPoint> {
	let mut probabilities_positives: Vec<(f32, bool)> = probabilities
		.iter()
		.copied()
		.zip(positives.iter().copied())
		.collect();
	probabilities_positives.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
	let mut tps_fps: Vec<TpsFpsPoint> = Vec::new();
	for (probability, positive) in probabilities_positives {
		let tp = if positive { 1 } else { 0 };
		// if probability is same as the last one, add to the previous bucket
		match tps_fps.last_mut() {
			Some(last) if probability == last.threshold => {
				last.true_positives += tp;
				last.false_positives += 1 - tp;
			}
			_ => tps_fps.push(TpsFpsPoint {
				threshold: probability,
				true_positives: tp,
				false_positives: 1 - tp,
			}),
		}
	}
	tps_fps
}

#[test]
fn test_roc_curve() {
	let positives = vec![true, true, false, false];
	let probabilities = vec![0.9, 0.4, 0.4, 0.2];
	let left = compute_roc_curve(&probabilities, &positives).unwrap();
	let right = vec![
		ROCCurvePoint {
			threshold: 1.0,
			true_positive_rate: 0.0,
			false_positive_rate: 0.0,
		},
		ROCCurvePoint {
			threshold: 0.9,
			true_positive_rate: 0.5,
			false_positive_rate: 0.0,
		},
		ROCCurvePoint {
			threshold: 0.4,
			true_positive_rate: 1.0,
			false_positive_rate: 0.5,
		},
		ROCCurvePoint {
			threshold: 0.2,
			true_positive_rate: 1.0,
			false_positive_rate: 1.0,
		},
	];
	assert_eq!(left, right);
	let auc = auc_roc(&probabilities, &positives).unwrap();
	assert!(f32::abs(auc - 0.875) < f32::EPSILON)
}

#[test]
fn test_auc_roc_undefined_without_negatives() {
	assert_eq!(auc_roc(&[0.3, 0.8], &[true, true]), None);
	assert_eq!(auc_roc(&[], &[]), None);
}
