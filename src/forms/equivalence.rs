use std::collections::HashMap;

use super::catalogue::Domain;
use crate::expr::Expr;

/// Number of sample points per comparison.
const SAMPLES: usize = 8;

/// Fractional parts of √2, √3, √5, √7, √11, √13, √17, √19.
///
/// Each symbol walks its domain with its own irrational stride, so sample
/// points never line up along a diagonal.
const STRIDES: [f64; 8] = [
    0.414213562373095,
    0.732050807568877,
    0.236067977499790,
    0.645751311064591,
    0.316624790355400,
    0.605551275463989,
    0.123105625617661,
    0.358898943540674,
];

const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Decides whether `candidate` and `canonical` describe the same function.
///
/// Both must have exactly the same free symbols, and must agree at every
/// deterministic sample point drawn from `domains`. A point where either side
/// fails to evaluate or produces a non-finite value counts as a mismatch.
pub(crate) fn equivalent(candidate: &Expr, canonical: &Expr, domains: &[(&str, Domain)]) -> bool {
    if candidate.symbols() != canonical.symbols() {
        return false;
    }

    (0..SAMPLES).all(|k| {
        let bindings = sample_point(k, domains);
        match (candidate.eval(&bindings), canonical.eval(&bindings)) {
            (Ok(a), Ok(b)) => close(a, b),
            _ => false,
        }
    })
}

fn sample_point<'a>(k: usize, domains: &[(&'a str, Domain)]) -> HashMap<&'a str, f64> {
    domains
        .iter()
        .enumerate()
        .map(|(j, (name, domain))| {
            let stride = STRIDES[j % STRIDES.len()];
            let fraction = (0.5 + (k + 1) as f64 * stride).fract();
            (*name, domain.at(fraction))
        })
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    a.is_finite()
        && b.is_finite()
        && (a - b).abs() <= RELATIVE_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}
