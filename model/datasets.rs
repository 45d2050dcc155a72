/*!
Small built in datasets for trying out learners.
*/

use crate::{Attribute, Instances};
use ndarray::prelude::*;

/// The classic 14 day weather data: should we play outside?
pub fn weather() -> Instances {
	const ROWS: [(usize, f32, f32, usize, usize); 14] = [
		(0, 85.0, 85.0, 0, 1),
		(0, 80.0, 90.0, 1, 1),
		(1, 83.0, 86.0, 0, 0),
		(2, 70.0, 96.0, 0, 0),
		(2, 68.0, 80.0, 0, 0),
		(2, 65.0, 70.0, 1, 1),
		(1, 64.0, 65.0, 1, 0),
		(0, 72.0, 95.0, 0, 1),
		(0, 69.0, 70.0, 0, 0),
		(2, 75.0, 80.0, 0, 0),
		(0, 75.0, 70.0, 1, 0),
		(1, 72.0, 90.0, 1, 0),
		(1, 81.0, 75.0, 0, 0),
		(2, 71.0, 91.0, 1, 1),
	];
	let mut features = Array2::zeros((ROWS.len(), 4));
	let mut labels = Vec::with_capacity(ROWS.len());
	for (mut row, (outlook, temperature, humidity, windy, play)) in
		features.genrows_mut().into_iter().zip(ROWS.iter())
	{
		row[0] = *outlook as f32;
		row[1] = *temperature;
		row[2] = *humidity;
		row[3] = *windy as f32;
		labels.push(*play);
	}
	Instances {
		attributes: vec![
			Attribute::Enum {
				name: "outlook".to_owned(),
				options: vec!["sunny".to_owned(), "overcast".to_owned(), "rainy".to_owned()],
			},
			Attribute::Number {
				name: "temperature".to_owned(),
			},
			Attribute::Number {
				name: "humidity".to_owned(),
			},
			Attribute::Enum {
				name: "windy".to_owned(),
				options: vec!["FALSE".to_owned(), "TRUE".to_owned()],
			},
		],
		features,
		weights: vec![1.0; labels.len()],
		labels,
		classes: vec!["yes".to_owned(), "no".to_owned()],
	}
}

/**
Three well separated classes of 20 examples each. The number attribute `x` separates the classes on its own, `y` overlaps them, and the enum attribute `parity` is noise.
*/
pub fn blobs() -> Instances {
	let n_examples = 60;
	let mut features = Array2::zeros((n_examples, 3));
	let mut labels = Vec::with_capacity(n_examples);
	for (i, mut row) in features.genrows_mut().into_iter().enumerate() {
		let class = i % 3;
		row[0] = class as f32 * 2.0 + ((i * 7) % 10) as f32 * 0.1;
		row[1] = ((i * 13) % 10) as f32 * 0.1 - class as f32 * 0.5;
		row[2] = (i % 2) as f32;
		labels.push(class);
	}
	Instances {
		attributes: vec![
			Attribute::Number {
				name: "x".to_owned(),
			},
			Attribute::Number {
				name: "y".to_owned(),
			},
			Attribute::Enum {
				name: "parity".to_owned(),
				options: vec!["even".to_owned(), "odd".to_owned()],
			},
		],
		features,
		weights: vec![1.0; n_examples],
		labels,
		classes: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
	}
}

/// Two classes told apart only by a number attribute whose values are consecutive floats.
pub fn adjacent_values() -> Instances {
	let values = [-0.4f32, -0.4, -0.4, -0.39999998, -0.39999998, -0.39999998];
	let n_examples = values.len();
	Instances {
		attributes: vec![Attribute::Number {
			name: "x".to_owned(),
		}],
		features: Array2::from_shape_vec((n_examples, 1), values.to_vec())
			.unwrap_or_else(|_| Array2::zeros((n_examples, 1))),
		weights: vec![1.0; n_examples],
		labels: vec![0, 0, 0, 1, 1, 1],
		classes: vec!["a".to_owned(), "b".to_owned()],
	}
}

/// The fraction of `instances` that `model` classifies correctly.
pub fn training_accuracy(model: &dyn crate::Model, instances: &Instances) -> f32 {
	let n_correct = instances
		.features
		.genrows()
		.into_iter()
		.zip(instances.labels.iter())
		.filter(|(example, label)| {
			model
				.predict(example.view())
				.map(|prediction| prediction == **label)
				.unwrap_or(false)
		})
		.count();
	n_correct as f32 / instances.n_examples() as f32
}

#[test]
fn test_datasets() {
	let weather = weather();
	assert_eq!(weather.class_weights(), vec![9.0, 5.0]);
	let blobs = blobs();
	assert_eq!(blobs.class_weights(), vec![20.0, 20.0, 20.0]);
	assert!(blobs.features[(0, 0)] < 1.0 && blobs.features[(1, 0)] >= 2.0);
}
