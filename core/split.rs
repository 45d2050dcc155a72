/*!
This module decides which rows of a dataset are used for training and which for testing. The first rows train and the rest test, in file order.
*/

use num_traits::ToPrimitive;

/// The fraction of the rows used for training, strictly between zero and one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitRatio(f64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPreset {
	Train70,
	Train80,
	Train60,
	Train90,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("invalid split \"{0}\": expected a split preset or a fraction between 0 and 1")]
pub struct InvalidSplitRatioError(pub String);

impl SplitPreset {
	/// The presets in the order they are offered.
	pub const ALL: [SplitPreset; 4] = [
		SplitPreset::Train70,
		SplitPreset::Train80,
		SplitPreset::Train60,
		SplitPreset::Train90,
	];

	pub fn name(self) -> &'static str {
		match self {
			SplitPreset::Train70 => "70% Train / 30% Test",
			SplitPreset::Train80 => "80% Train / 20% Test",
			SplitPreset::Train60 => "60% Train / 40% Test",
			SplitPreset::Train90 => "90% Train / 10% Test",
		}
	}

	pub fn ratio(self) -> SplitRatio {
		SplitRatio(match self {
			SplitPreset::Train70 => 0.7,
			SplitPreset::Train80 => 0.8,
			SplitPreset::Train60 => 0.6,
			SplitPreset::Train90 => 0.9,
		})
	}
}

impl Default for SplitRatio {
	fn default() -> Self {
		SplitPreset::Train70.ratio()
	}
}

impl SplitRatio {
	pub fn new(ratio: f64) -> Result<Self, InvalidSplitRatioError> {
		if ratio.is_finite() && ratio > 0.0 && ratio < 1.0 {
			Ok(SplitRatio(ratio))
		} else {
			Err(InvalidSplitRatioError(ratio.to_string()))
		}
	}

	pub fn get(self) -> f64 {
		self.0
	}

	/// The preset with this ratio, if there is one.
	pub fn preset(self) -> Option<SplitPreset> {
		SplitPreset::ALL
			.iter()
			.copied()
			.find(|preset| preset.ratio() == self)
	}
}

impl std::str::FromStr for SplitRatio {
	type Err = InvalidSplitRatioError;
	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let value = value.trim();
		if let Some(preset) = SplitPreset::ALL
			.iter()
			.find(|preset| preset.name().eq_ignore_ascii_case(value))
		{
			return Ok(preset.ratio());
		}
		let ratio: f64 = value
			.parse()
			.map_err(|_| InvalidSplitRatioError(value.to_owned()))?;
		SplitRatio::new(ratio).map_err(|_| InvalidSplitRatioError(value.to_owned()))
	}
}

impl std::fmt::Display for SplitRatio {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if let Some(preset) = self.preset() {
			return write!(f, "{}", preset.name());
		}
		let train = format_percent(100.0 * self.0);
		let test = format_percent(100.0 * (1.0 - self.0));
		write!(f, "{}% Train / {}% Test", train, test)
	}
}

/// Format a percentage with at most one decimal place.
fn format_percent(percent: f64) -> String {
	let rounded = (percent * 10.0).round() / 10.0;
	if rounded.fract() == 0.0 {
		format!("{:.0}", rounded)
	} else {
		format!("{:.1}", rounded)
	}
}

/// The number of rows in each part of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitPlan {
	pub train_size: usize,
	pub test_size: usize,
}

impl SplitPlan {
	/// The training part gets `n_rows * ratio` rows rounded half up, and the testing part gets the rest.
	pub fn new(n_rows: usize, ratio: SplitRatio) -> Self {
		let train_size = (n_rows.to_f64().unwrap_or(0.0) * ratio.get() + 0.5)
			.floor()
			.to_usize()
			.unwrap_or(0)
			.min(n_rows);
		Self {
			train_size,
			test_size: n_rows - train_size,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_plan() {
		let plan = |n_rows, ratio| SplitPlan::new(n_rows, SplitRatio::new(ratio).unwrap());
		assert_eq!(plan(100, 0.7), SplitPlan { train_size: 70, test_size: 30 });
		assert_eq!(plan(1, 0.9), SplitPlan { train_size: 1, test_size: 0 });
		assert_eq!(plan(5, 0.9), SplitPlan { train_size: 5, test_size: 0 });
		assert_eq!(plan(5, 0.5), SplitPlan { train_size: 3, test_size: 2 });
		assert_eq!(plan(0, 0.7), SplitPlan { train_size: 0, test_size: 0 });
		for n_rows in 1..50 {
			for ratio in &[0.01, 0.33, 0.5, 0.7, 0.99] {
				let plan = plan(n_rows, *ratio);
				assert_eq!(plan.train_size + plan.test_size, n_rows);
			}
		}
	}

	#[test]
	fn test_invalid_ratios() {
		assert!(SplitRatio::new(0.0).is_err());
		assert!(SplitRatio::new(1.0).is_err());
		assert!(SplitRatio::new(-0.5).is_err());
		assert!(SplitRatio::new(std::f64::NAN).is_err());
		assert!("1.5".parse::<SplitRatio>().is_err());
		assert!("most of it".parse::<SplitRatio>().is_err());
	}

	#[test]
	fn test_parse_and_display() {
		let ratio: SplitRatio = "80% Train / 20% Test".parse().unwrap();
		assert_eq!(ratio, SplitPreset::Train80.ratio());
		assert_eq!(ratio.to_string(), "80% Train / 20% Test");
		let ratio: SplitRatio = "0.75".parse().unwrap();
		assert_eq!(ratio.preset(), None);
		assert_eq!(ratio.to_string(), "75% Train / 25% Test");
		let ratio: SplitRatio = "0.9".parse().unwrap();
		assert_eq!(ratio.preset(), Some(SplitPreset::Train90));
	}
}
