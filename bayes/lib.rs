/*!
This crate implements Bayesian classifiers. [`NaiveBayes`](struct.NaiveBayes.html) assumes the attributes are independent given the class. [`BayesNet`](struct.BayesNet.html) discretizes the number attributes and learns a network in which each attribute may depend on one other attribute besides the class.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod bayes_net;
mod naive_bayes;

pub use self::bayes_net::{BayesNet, BayesNetModel};
pub use self::naive_bayes::{NaiveBayes, NaiveBayesModel};

use ndarray::prelude::*;

/// Turn log probabilities into a distribution that sums to one.
fn softmax(log_probabilities: &[f64]) -> Array1<f32> {
	let max = log_probabilities
		.iter()
		.cloned()
		.fold(std::f64::NEG_INFINITY, f64::max);
	let mut distribution: Array1<f32> = log_probabilities
		.iter()
		.map(|log_probability| (log_probability - max).exp() as f32)
		.collect();
	suinz_model::normalize(&mut distribution);
	distribution
}

#[test]
fn test_softmax() {
	let distribution = softmax(&[0.0, 2.0f64.ln()]);
	assert!((distribution[0] - 1.0 / 3.0).abs() < 1e-6);
	let distribution = softmax(&[-2000.0, -2000.0]);
	assert_eq!(distribution, arr1(&[0.5, 0.5]));
}
