/*!
Numeric helpers shared by the learners: entropies of weighted counts, the inverse of the normal distribution, the log gamma function, and the pessimistic error estimate used to prune C4.5 trees.
*/

/// `x * log2(x)`, with `0 * log2(0) = 0`.
pub fn x_log2_x(x: f64) -> f64 {
	if x > 0.0 {
		x * x.log2()
	} else {
		0.0
	}
}

/// The entropy in bits of the class distribution given by `counts`.
pub fn entropy(counts: &[f64]) -> f64 {
	let total: f64 = counts.iter().sum();
	if total <= 0.0 {
		return 0.0;
	}
	let sum: f64 = counts.iter().map(|count| x_log2_x(*count)).sum();
	(x_log2_x(total) - sum) / total
}

/// The weighted average entropy of the class distributions in the rows of `counts`, which is the entropy of the class given the row.
pub fn conditional_entropy(counts: &[Vec<f64>]) -> f64 {
	let mut total = 0.0;
	let mut sum = 0.0;
	for row in counts {
		let row_total: f64 = row.iter().sum();
		total += row_total;
		sum += x_log2_x(row_total) - row.iter().map(|count| x_log2_x(*count)).sum::<f64>();
	}
	if total <= 0.0 {
		0.0
	} else {
		sum / total
	}
}

/// The entropy in bits of the distribution of the rows' totals, which is the split information of a split that sends each row to a branch.
pub fn split_entropy(counts: &[Vec<f64>]) -> f64 {
	let totals: Vec<f64> = counts.iter().map(|row| row.iter().sum()).collect();
	entropy(&totals)
}

/// The natural log of the gamma function, using the Lanczos approximation.
pub fn ln_gamma(x: f64) -> f64 {
	const COEFFICIENTS: [f64; 6] = [
		76.180_091_729_471_46,
		-86.505_320_329_416_77,
		24.014_098_240_830_91,
		-1.231_739_572_450_155,
		0.120_865_097_386_617_9e-2,
		-0.539_523_938_495_3e-5,
	];
	let mut y = x;
	let tmp = x + 5.5;
	let tmp = tmp - (x + 0.5) * tmp.ln();
	let mut series = 1.000_000_000_190_015;
	for coefficient in COEFFICIENTS.iter() {
		y += 1.0;
		series += coefficient / y;
	}
	-tmp + (2.506_628_274_631_000_5 * series / x).ln()
}

/// The value below which the standard normal distribution has probability `p`, using Acklam's rational approximation.
pub fn normal_inverse(p: f64) -> f64 {
	const A: [f64; 6] = [
		-3.969_683_028_665_376e1,
		2.209_460_984_245_205e2,
		-2.759_285_104_469_687e2,
		1.383_577_518_672_69e2,
		-3.066_479_806_614_716e1,
		2.506_628_277_459_239,
	];
	const B: [f64; 5] = [
		-5.447_609_879_822_406e1,
		1.615_858_368_580_409e2,
		-1.556_989_798_598_866e2,
		6.680_131_188_771_972e1,
		-1.328_068_155_288_572e1,
	];
	const C: [f64; 6] = [
		-7.784_894_002_430_293e-3,
		-3.223_964_580_411_365e-1,
		-2.400_758_277_161_838,
		-2.549_732_539_343_734,
		4.374_664_141_464_968,
		2.938_163_982_698_783,
	];
	const D: [f64; 4] = [
		7.784_695_709_041_462e-3,
		3.224_671_290_700_398e-1,
		2.445_134_137_142_996,
		3.754_408_661_907_416,
	];
	const P_LOW: f64 = 0.024_25;
	if p <= 0.0 {
		return std::f64::NEG_INFINITY;
	}
	if p >= 1.0 {
		return std::f64::INFINITY;
	}
	if p < P_LOW {
		let q = (-2.0 * p.ln()).sqrt();
		(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
			/ ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
	} else if p <= 1.0 - P_LOW {
		let q = p - 0.5;
		let r = q * q;
		(((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
			/ (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
	} else {
		let q = (-2.0 * (1.0 - p).ln()).sqrt();
		-(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
			/ ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
	}
}

/**
The number of errors to add to the `errors` observed among `n` instances to get the upper limit of the confidence interval for the true error count at confidence `confidence`. This is the pessimistic estimate C4.5 prunes with.
*/
pub fn additional_errors(n: f64, errors: f64, confidence: f64) -> f64 {
	if n <= 0.0 || confidence > 0.5 {
		return 0.0;
	}
	if errors < 1.0 {
		let base = n * (1.0 - confidence.powf(1.0 / n));
		if errors == 0.0 {
			return base;
		}
		return base + errors * (additional_errors(n, 1.0, confidence) - base);
	}
	if errors + 0.5 >= n {
		return f64::max(n - errors, 0.0);
	}
	let z = normal_inverse(1.0 - confidence);
	let f = (errors + 0.5) / n;
	let r = (f + (z * z) / (2.0 * n)
		+ z * ((f / n) - (f * f / n) + (z * z / (4.0 * n * n))).sqrt())
		/ (1.0 + (z * z) / n);
	r * n - errors
}

#[test]
fn test_entropy() {
	assert!((entropy(&[5.0, 5.0]) - 1.0).abs() < 1e-12);
	assert_eq!(entropy(&[4.0, 0.0]), 0.0);
	assert_eq!(entropy(&[]), 0.0);
	let counts = vec![vec![2.0, 2.0], vec![4.0, 0.0]];
	assert!((conditional_entropy(&counts) - 0.5).abs() < 1e-12);
	assert!((split_entropy(&counts) - 1.0).abs() < 1e-12);
}

#[test]
fn test_ln_gamma() {
	assert!((ln_gamma(5.0) - 24.0f64.ln()).abs() < 1e-8);
	assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-8);
}

#[test]
fn test_normal_inverse() {
	assert!((normal_inverse(0.5)).abs() < 1e-9);
	assert!((normal_inverse(0.75) - 0.674_489_75).abs() < 1e-6);
	assert!((normal_inverse(0.01) + 2.326_347_87).abs() < 1e-6);
}

#[test]
fn test_additional_errors() {
	// A leaf of 6 instances with no errors is estimated to make about 1.24 errors at 25% confidence.
	assert!((additional_errors(6.0, 0.0, 0.25) - 1.2378).abs() < 1e-3);
	assert_eq!(additional_errors(2.0, 2.0, 0.25), 0.0);
	assert!(additional_errors(100.0, 10.0, 0.25) > 0.0);
}
