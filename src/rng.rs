const FALLBACK_SEED: u64 = 0xA5A5_A5A5_A5A5_A5A5;

/// xorshift64* generator; the zero state is remapped because xorshift would
/// stay at zero forever.
#[derive(Debug, Clone)]
pub(crate) struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { FALLBACK_SEED } else { seed },
        }
    }

    pub(crate) fn reseed(&mut self, seed: u64) {
        self.state = if seed == 0 { FALLBACK_SEED } else { seed };
    }

    /// Uniform f64 in [0.0, 1.0) from the top 53 bits.
    pub(crate) fn next_f64(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = if x == 0 { FALLBACK_SEED } else { x };
        let out = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
        let mantissa = out >> 11;
        (mantissa as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_same_sequence() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn zero_seed_is_remapped() {
        let mut zero = SeededRng::new(0);
        let mut fallback = SeededRng::new(FALLBACK_SEED);
        assert_eq!(zero.next_f64().to_bits(), fallback.next_f64().to_bits());
    }

    #[test]
    fn output_stays_in_unit_interval() {
        let mut rng = SeededRng::new(7);
        for _ in 0..1024 {
            let draw = rng.next_f64();
            assert!((0.0..1.0).contains(&draw));
        }
    }
}
