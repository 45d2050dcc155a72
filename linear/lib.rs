/*!
This crate implements linear classifiers. [`Logistic`](struct.Logistic.html) is multinomial logistic regression: it trains one linear model per class whose outputs are combined with the `softmax` function. [`SMO`](struct.SMO.html) trains a linear support vector machine for every pair of classes with sequential minimal optimization and combines their votes.

Linear models need numeric features, so both first pass the examples through a [`FeatureEncoder`](struct.FeatureEncoder.html), which fills in missing values, scales number attributes, and expands each enum attribute into one indicator feature per option.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod early_stopping;
mod encoder;
mod logistic;
mod smo;

pub use self::early_stopping::EarlyStoppingOptions;
pub use self::encoder::{FeatureEncoder, Scaling};
pub use self::logistic::{Logistic, LogisticModel};
pub use self::smo::{LinearSvm, SMOModel, SMO};
