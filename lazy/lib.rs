/*!
This crate implements instance based classifiers. They keep the training data and do their work when asked to classify an example. [`IBk`](struct.IBk.html) votes among the nearest neighbours, [`KStar`](struct.KStar.html) sums the probability of transforming the example into each training instance, and [`LWL`](struct.LWL.html) trains a model on the training data weighted by distance to the example.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod distance;
mod ibk;
mod kstar;
mod lwl;

pub use self::distance::EuclideanDistance;
pub use self::ibk::{IBk, IBkModel};
pub use self::kstar::{KStar, KStarModel};
pub use self::lwl::{LWLModel, LWL};
