//! Log-space hypergeometric upper tail

use statrs::function::factorial::ln_factorial;

/// `ln(i!)` cached for `i` in `0..=max`; larger arguments go through
/// `statrs` directly, so the cache never grows with the seed weight.
#[derive(Debug, Clone)]
pub struct LogFactorials {
    table: Vec<f64>,
}

impl LogFactorials {
    pub fn new(max: usize) -> Self {
        Self {
            table: (0..=max as u64).map(ln_factorial).collect(),
        }
    }

    /// Largest `n` with a cached `ln(n!)`
    pub fn max(&self) -> u64 {
        (self.table.len() - 1) as u64
    }

    fn ln_factorial(&self, n: u64) -> f64 {
        match self.table.get(n as usize) {
            Some(&value) => value,
            None => ln_factorial(n),
        }
    }

    /// `ln C(n, k)`; callers guarantee `k <= n`
    fn ln_choose(&self, n: u64, k: u64) -> f64 {
        self.ln_factorial(n) - self.ln_factorial(k) - self.ln_factorial(n - k)
    }

    /// `ln P(X >= observed)` for `X ~ Hypergeometric(population, successes, draws)`.
    ///
    /// Inputs are clamped into the distribution's support, so the result is
    /// always a valid log-probability in `(-inf, 0]`. `observed == 0` gives 0.
    /// The number of summed terms is bounded by `draws`.
    pub fn ln_upper_tail(&self, population: u64, successes: u64, draws: u64, observed: u64) -> f64 {
        if observed == 0 {
            return 0.0;
        }

        let successes = successes.min(population);
        let draws = draws.min(population);
        let failures = population - successes;

        let hi = draws.min(successes);
        let observed = observed.min(hi);
        let lo = observed.max(draws.saturating_sub(failures));
        if lo > hi {
            return 0.0;
        }

        let ln_total = self.ln_choose(population, draws);
        let terms: Vec<f64> = (lo..=hi)
            .map(|i| {
                self.ln_choose(successes, i) + self.ln_choose(failures, draws - i) - ln_total
            })
            .collect();

        let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return max.min(0.0);
        }
        let sum: f64 = terms.iter().map(|t| (t - max).exp()).sum();

        (max + sum.ln()).min(0.0)
    }

    /// Upper-tail p-value in `[0, 1]`
    pub fn upper_tail(&self, population: u64, successes: u64, draws: u64, observed: u64) -> f64 {
        self.ln_upper_tail(population, successes, draws, observed)
            .exp()
            .clamp(0.0, 1.0)
    }
}
