use crate::error::{EngineError, Result};
use crate::models::{PosteriorEstimate, PriorSpec};

pub const DEFAULT_COVERAGE: f64 = 0.95;

/// Beta-Binomial conjugate update with the default 95% equal-tailed
/// credible interval. Pure and deterministic: no I/O, no hidden state.
pub fn posterior(prior: &PriorSpec, events: u64, n: u64) -> Result<PosteriorEstimate> {
    posterior_with_coverage(prior, events, n, DEFAULT_COVERAGE)
}

/// As [`posterior`] with an explicit interval coverage in (0, 1).
/// `events > n` is a contract violation and is rejected, never clamped.
pub fn posterior_with_coverage(
    prior: &PriorSpec,
    events: u64,
    n: u64,
    coverage: f64,
) -> Result<PosteriorEstimate> {
    if events > n {
        return Err(EngineError::InvalidInput(format!(
            "events ({events}) cannot exceed trials ({n})"
        )));
    }
    if !(coverage > 0.0 && coverage < 1.0) {
        return Err(EngineError::InvalidInput(format!(
            "coverage must be in (0, 1), got {coverage}"
        )));
    }
    if !(prior.alpha > 0.0 && prior.beta > 0.0) {
        return Err(EngineError::InvalidInput(format!(
            "prior parameters must be positive, got alpha={}, beta={}",
            prior.alpha, prior.beta
        )));
    }

    #[allow(clippy::cast_precision_loss, reason = "clinical counts are far below 2^52")]
    let (events_f, failures_f) = (events as f64, (n - events) as f64);
    let alpha = prior.alpha + events_f;
    let beta = prior.beta + failures_f;
    let mean = alpha / (alpha + beta);
    let tail = (1.0 - coverage) / 2.0;

    Ok(PosteriorEstimate {
        alpha,
        beta,
        mean,
        credible_interval: (beta_quantile(tail, alpha, beta), beta_quantile(1.0 - tail, alpha, beta)),
        coverage,
    })
}

/// Inverse of the regularized incomplete beta function, by bisection.
/// The pack carries no statistics crate; the numerics below are the standard
/// Lanczos / Lentz formulations and converge well past the precision any
/// credible interval needs.
fn beta_quantile(p: f64, alpha: f64, beta: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&p));
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    let mut mid = 0.5;
    for _ in 0..200 {
        mid = 0.5 * (lo + hi);
        if regularized_incomplete_beta(mid, alpha, beta) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-12 {
            break;
        }
    }
    mid
}

/// I_x(a, b) via the continued-fraction expansion (Lentz's method), using the
/// symmetry relation to stay in the rapidly converging region.
fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const TINY: f64 = 1e-30;
    const EPS: f64 = 1e-15;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=200 {
        let m = f64::from(m);
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Lanczos approximation (g = 7, n = 9), accurate to ~15 significant digits
/// for positive arguments.
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula keeps the approximation in its valid region.
        return std::f64::consts::PI.ln()
            - (std::f64::consts::PI * x).sin().ln()
            - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = COEFFS[0];
    for (i, coeff) in COEFFS.iter().enumerate().skip(1) {
        #[allow(clippy::cast_precision_loss, reason = "i <= 8")]
        {
            acc += coeff / (x + i as f64);
        }
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}
