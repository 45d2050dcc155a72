/*!
This module lists the algorithms a pipeline can train. Each [`Algorithm`](enum.Algorithm.html) has a unique display name, a family, and a factory that creates its learner with default options.
*/

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use suinz_bayes::{BayesNet, NaiveBayes};
use suinz_lazy::{IBk, KStar, LWL};
use suinz_linear::{Logistic, SMO};
use suinz_meta::{AdaBoostM1, Bagging, LogitBoost, RandomCommittee, RandomSubSpace};
use suinz_model::Learner;
use suinz_rules::{DecisionTable, JRip, OneR, ZeroR, PART};
use suinz_tree::{DecisionStump, RandomForest, RandomTree, REPTree, J48};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
	J48,
	RandomForest,
	RandomTree,
	DecisionStump,
	REPTree,
	NaiveBayes,
	BayesNet,
	IBk,
	KStar,
	LWL,
	Logistic,
	SMO,
	ZeroR,
	OneR,
	PART,
	JRip,
	DecisionTable,
	AdaBoostM1,
	Bagging,
	LogitBoost,
	RandomCommittee,
	RandomSubSpace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
	Trees,
	Bayes,
	Lazy,
	Functions,
	Rules,
	Meta,
}

pub struct Descriptor {
	pub algorithm: Algorithm,
	pub name: &'static str,
	pub family: Family,
	pub learner: fn() -> Box<dyn Learner>,
}

/// Every algorithm, in the order they are offered.
pub static DESCRIPTORS: &[Descriptor] = &[
	Descriptor {
		algorithm: Algorithm::J48,
		name: "J48 (Decision Tree)",
		family: Family::Trees,
		learner: || Box::new(J48::default()),
	},
	Descriptor {
		algorithm: Algorithm::RandomForest,
		name: "Random Forest",
		family: Family::Trees,
		learner: || Box::new(RandomForest::default()),
	},
	Descriptor {
		algorithm: Algorithm::RandomTree,
		name: "Random Tree",
		family: Family::Trees,
		learner: || Box::new(RandomTree::default()),
	},
	Descriptor {
		algorithm: Algorithm::DecisionStump,
		name: "Decision Stump",
		family: Family::Trees,
		learner: || Box::new(DecisionStump),
	},
	Descriptor {
		algorithm: Algorithm::REPTree,
		name: "REPTree",
		family: Family::Trees,
		learner: || Box::new(REPTree::default()),
	},
	Descriptor {
		algorithm: Algorithm::NaiveBayes,
		name: "Naive Bayes",
		family: Family::Bayes,
		learner: || Box::new(NaiveBayes),
	},
	Descriptor {
		algorithm: Algorithm::BayesNet,
		name: "Bayes Net",
		family: Family::Bayes,
		learner: || Box::new(BayesNet::default()),
	},
	Descriptor {
		algorithm: Algorithm::IBk,
		name: "IBk (KNN)",
		family: Family::Lazy,
		learner: || Box::new(IBk::default()),
	},
	Descriptor {
		algorithm: Algorithm::KStar,
		name: "KStar",
		family: Family::Lazy,
		learner: || Box::new(KStar::default()),
	},
	Descriptor {
		algorithm: Algorithm::LWL,
		name: "LWL",
		family: Family::Lazy,
		learner: || Box::new(LWL::default()),
	},
	Descriptor {
		algorithm: Algorithm::Logistic,
		name: "Logistic Regression",
		family: Family::Functions,
		learner: || Box::new(Logistic::default()),
	},
	Descriptor {
		algorithm: Algorithm::SMO,
		name: "SMO (SVM)",
		family: Family::Functions,
		learner: || Box::new(SMO::default()),
	},
	Descriptor {
		algorithm: Algorithm::ZeroR,
		name: "ZeroR",
		family: Family::Rules,
		learner: || Box::new(ZeroR),
	},
	Descriptor {
		algorithm: Algorithm::OneR,
		name: "OneR",
		family: Family::Rules,
		learner: || Box::new(OneR::default()),
	},
	Descriptor {
		algorithm: Algorithm::PART,
		name: "PART",
		family: Family::Rules,
		learner: || Box::new(PART::default()),
	},
	Descriptor {
		algorithm: Algorithm::JRip,
		name: "JRip (RIPPER)",
		family: Family::Rules,
		learner: || Box::new(JRip::default()),
	},
	Descriptor {
		algorithm: Algorithm::DecisionTable,
		name: "Decision Table",
		family: Family::Rules,
		learner: || Box::new(DecisionTable::default()),
	},
	Descriptor {
		algorithm: Algorithm::AdaBoostM1,
		name: "AdaBoostM1",
		family: Family::Meta,
		learner: || Box::new(AdaBoostM1::default()),
	},
	Descriptor {
		algorithm: Algorithm::Bagging,
		name: "Bagging",
		family: Family::Meta,
		learner: || Box::new(Bagging::default()),
	},
	Descriptor {
		algorithm: Algorithm::LogitBoost,
		name: "LogitBoost",
		family: Family::Meta,
		learner: || Box::new(LogitBoost::default()),
	},
	Descriptor {
		algorithm: Algorithm::RandomCommittee,
		name: "Random Committee",
		family: Family::Meta,
		learner: || Box::new(RandomCommittee::default()),
	},
	Descriptor {
		algorithm: Algorithm::RandomSubSpace,
		name: "Random SubSpace",
		family: Family::Meta,
		learner: || Box::new(RandomSubSpace::default()),
	},
];

static BY_NAME: Lazy<BTreeMap<&'static str, Algorithm>> = Lazy::new(|| {
	DESCRIPTORS
		.iter()
		.map(|descriptor| (descriptor.name, descriptor.algorithm))
		.collect()
});

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("unknown algorithm \"{0}\"")]
pub struct UnknownAlgorithmError(pub String);

impl Algorithm {
	pub fn from_name(name: &str) -> Result<Self, UnknownAlgorithmError> {
		BY_NAME
			.get(name)
			.copied()
			.ok_or_else(|| UnknownAlgorithmError(name.to_owned()))
	}

	pub fn descriptor(self) -> &'static Descriptor {
		// DESCRIPTORS lists the variants in declaration order.
		&DESCRIPTORS[self as usize]
	}

	pub fn name(self) -> &'static str {
		self.descriptor().name
	}

	pub fn family(self) -> Family {
		self.descriptor().family
	}

	/// Create an untrained learner with the default options.
	pub fn learner(self) -> Box<dyn Learner> {
		(self.descriptor().learner)()
	}

	pub fn all() -> impl Iterator<Item = Algorithm> {
		DESCRIPTORS.iter().map(|descriptor| descriptor.algorithm)
	}
}

impl std::fmt::Display for Algorithm {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

impl std::str::FromStr for Algorithm {
	type Err = UnknownAlgorithmError;
	fn from_str(name: &str) -> Result<Self, Self::Err> {
		Algorithm::from_name(name)
	}
}

impl Family {
	pub fn name(self) -> &'static str {
		match self {
			Family::Trees => "Trees",
			Family::Bayes => "Bayes",
			Family::Lazy => "Lazy",
			Family::Functions => "Functions",
			Family::Rules => "Rules",
			Family::Meta => "Meta",
		}
	}
}

impl std::fmt::Display for Family {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_descriptors_match_variants() {
		assert_eq!(DESCRIPTORS.len(), 22);
		for (index, descriptor) in DESCRIPTORS.iter().enumerate() {
			assert_eq!(descriptor.algorithm as usize, index);
			assert_eq!(Algorithm::from_name(descriptor.name), Ok(descriptor.algorithm));
		}
		assert_eq!(BY_NAME.len(), DESCRIPTORS.len());
	}

	#[test]
	fn test_unknown_algorithm() {
		assert_eq!(
			Algorithm::from_name("Deep Belief Network"),
			Err(UnknownAlgorithmError("Deep Belief Network".to_owned()))
		);
		assert!("j48 (decision tree)".parse::<Algorithm>().is_err());
	}

	#[test]
	fn test_families() {
		assert_eq!(Algorithm::J48.family(), Family::Trees);
		assert_eq!(Algorithm::SMO.family(), Family::Functions);
		assert_eq!(Algorithm::RandomSubSpace.to_string(), "Random SubSpace");
		let n_rules = Algorithm::all()
			.filter(|algorithm| algorithm.family() == Family::Rules)
			.count();
		assert_eq!(n_rules, 5);
	}
}
