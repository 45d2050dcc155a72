/*!
This crate trains a classifier on the first part of a dataset and evaluates it on the rest. Call [`run`](fn.run.html) for a [`Report`](struct.Report.html), or [`respond`](fn.respond.html) for the text to show a user.

```no_run
use suinz_core::{respond, Config, TrainRequest};

let request = TrainRequest {
	file_path: Some("iris.arff".into()),
	algorithm: "Random Forest".to_owned(),
	split: "80% Train / 20% Test".parse().unwrap(),
};
println!("{}", respond(&request, &Config::default()));
```
*/

#![allow(clippy::tabs_in_doc_comments)]

mod config;
mod error;
mod pipeline;
pub mod registry;
mod report;
pub mod split;

pub use self::{
	config::Config,
	error::{EvaluationError, PipelineError},
	pipeline::{respond, run, Response, TrainRequest},
	registry::{Algorithm, Family, UnknownAlgorithmError},
	report::Report,
	split::{InvalidSplitRatioError, SplitPlan, SplitPreset, SplitRatio},
};
