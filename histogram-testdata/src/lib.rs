//! histogram-testdata
//! Synthetic data generators shared by tests, quality reports and benches.
//! Every generator is seeded, so a `(kind, n, seed)` triple always yields the same values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Pareto, StandardNormal};

/// Available synthetic distributions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistKind {
    /// Uniform in \[0,1)
    Uniform,
    /// Raw N(0, 1) samples, unbounded.
    StandardNormal,
    /// Gaussian mapped to \[0,1]
    Normal,
    /// Request latencies in microseconds: Pareto hump with a long tail,
    /// limited to (15ms, 10s).
    Latency,
    /// Mixed: clumps, broad region, and heavy tails in \[0,1]
    Mixture,
}

/// Generate `n` samples for the chosen distribution.
pub fn gen_dataset(kind: DistKind, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);

    match kind {
        DistKind::Uniform => {
            for _ in 0..n {
                out.push(rng.random::<f64>());
            }
        }
        DistKind::StandardNormal => {
            out.extend(Distribution::<f64>::sample_iter(StandardNormal, &mut rng).take(n));
        }
        DistKind::Normal => {
            let normal = Normal::new(0.0, 1.0).expect("unit normal is valid");
            for _ in 0..n {
                let z: f64 = normal.sample(&mut rng);
                out.push((0.5 + 0.2 * z).clamp(0.0, 1.0));
            }
        }
        DistKind::Latency => {
            let pareto = Pareto::new(1.0, 1.0).expect("pareto distribution should be valid");
            out.extend(
                pareto
                    .sample_iter(&mut rng)
                    // Scale by 10,000 to get microseconds.
                    .map(|x: f64| x * 10_000.0)
                    .filter(|x| *x > 15_000.0 && *x < 10_000_000.0)
                    .take(n),
            );
        }
        DistKind::Mixture => {
            for _ in 0..n {
                let bucket: u32 = rng.random_range(0..100);
                let v = match bucket {
                    // Clumps around 0.1, 0.5, 0.9 with micro-noise
                    0..=29 => {
                        let center = match rng.random_range(0..3) {
                            0 => 0.10,
                            1 => 0.50,
                            _ => 0.90,
                        };
                        center + rng.random_range(-1.0..1.0) * 1e-3
                    }
                    // Broad uniform region
                    30..=69 => rng.random::<f64>(),
                    // Heavier tails near 0 and 1
                    _ => {
                        let exp = rng.random_range(3.0..9.0);
                        if rng.random_bool(0.5) {
                            rng.random::<f64>().clamp(1e-12, 1.0).powf(exp)
                        } else {
                            1.0 - rng.random::<f64>().clamp(1e-12, 1.0).powf(exp)
                        }
                    }
                };
                out.push(v.clamp(0.0, 1.0));
            }
        }
    }
    out
}

/// Sorted copy of `values` (total order; the generators never emit NaN).
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}
