use rand::Rng;

/// Source of unit draws in [0,1) for the day generator.
///
/// `begin_day` is called once with the day's seed key before that day's draws.
/// Seeded sources restart their stream from the key; unseeded ones ignore it.
pub trait RandomSource {
    fn begin_day(&mut self, seed_key: i64);

    fn next_unit(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn begin_day(&mut self, seed_key: i64) {
        (**self).begin_day(seed_key)
    }

    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

// ---------------------------------------------------------------------------
// SineSeries: seeded, reproducible
// ---------------------------------------------------------------------------

/// Counter-based sine hash: `x = sin(counter) * 10000; counter += 1; x - floor(x)`.
///
/// Not statistically rigorous. Kept for bit-compatibility with the historical
/// mock series, which consumers compare against.
#[derive(Debug, Clone, Default)]
pub struct SineSeries {
    counter: f64,
}

impl SineSeries {
    pub fn new(seed_key: i64) -> Self {
        Self {
            counter: seed_key as f64,
        }
    }
}

impl RandomSource for SineSeries {
    fn begin_day(&mut self, seed_key: i64) {
        self.counter = seed_key as f64;
    }

    fn next_unit(&mut self) -> f64 {
        let x = self.counter.sin() * 10_000.0;
        self.counter += 1.0;
        x - x.floor()
    }
}

// ---------------------------------------------------------------------------
// UniformSource: unseeded fallback
// ---------------------------------------------------------------------------

/// Draws from an ambient RNG and ignores seed keys. Not idempotent.
#[derive(Debug, Clone)]
pub struct UniformSource<R> {
    rng: R,
}

impl<R: Rng> UniformSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl UniformSource<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for UniformSource<R> {
    fn begin_day(&mut self, _seed_key: i64) {}

    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sine_series_matches_reference_values() {
        // x = sin(1) * 10000 = 8414.709848078965, fractional part 0.709848...
        let mut s = SineSeries::new(1);
        let first = s.next_unit();
        assert!((first - 0.709848078965).abs() < 1e-6, "first={first}");
        // sin(2) * 10000 = 9092.974268256817
        let second = s.next_unit();
        assert!((second - 0.974268256817).abs() < 1e-6, "second={second}");
    }

    #[test]
    fn negative_sine_still_lands_in_unit_interval() {
        // sin(4) < 0, floor keeps the result in [0,1)
        let mut s = SineSeries::new(4);
        let v = s.next_unit();
        assert!((0.0..1.0).contains(&v), "v={v}");
    }

    #[test]
    fn begin_day_restarts_seeded_stream() {
        let mut s = SineSeries::default();
        s.begin_day(1_704_067_200_313);
        let a: Vec<f64> = (0..5).map(|_| s.next_unit()).collect();
        s.begin_day(1_704_067_200_313);
        let b: Vec<f64> = (0..5).map(|_| s.next_unit()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn uniform_source_ignores_seed_key() {
        let mut u = UniformSource::new(StdRng::seed_from_u64(7));
        u.begin_day(42);
        let a = u.next_unit();
        u.begin_day(42);
        let b = u.next_unit();
        assert_ne!(a, b);
        assert!((0.0..1.0).contains(&a) && (0.0..1.0).contains(&b));
    }
}
