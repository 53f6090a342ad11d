use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_spectrum(
    wavenumbers: &[f64],
    peaks: &[(f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    wavenumbers
        .iter()
        .map(|&wn| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wn, mu, sigma, amp))
                .sum();
            signal + rng.gauss(0.0, noise_level)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_csv(path: &str, x: &[f64], y: &[f64]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["wavenumber", "intensity"])?;
    for (xi, yi) in x.iter().zip(y) {
        writer.write_record([xi.to_string(), format!("{yi:.6}")])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_dat(path: &str, x: &[f64], y: &[f64]) -> Result<(), Box<dyn Error>> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "wavenumber    intensity")?;
    for (xi, yi) in x.iter().zip(y) {
        writeln!(out, "{xi:>10.1}    {yi:.6}")?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut rng = SimpleRng::new(42);

    // Wavenumbers: 4000 → 2002, step 2
    let wavenumbers: Vec<f64> = (0..1000).map(|i| 4000.0 - i as f64 * 2.0).collect();

    let samples: [(&str, Vec<(f64, f64, f64)>); 3] = [
        ("Sample_A_conc=0.5", vec![(3400.0, 80.0, 0.8), (2900.0, 40.0, 0.5), (2350.0, 30.0, 0.3)]),
        ("Sample_B_conc=1.0", vec![(3200.0, 60.0, 0.6), (2800.0, 50.0, 0.7), (2500.0, 35.0, 0.4)]),
        ("Sample_C_conc=2.0", vec![(3600.0, 70.0, 0.9), (3000.0, 45.0, 0.4), (2200.0, 25.0, 0.5)]),
    ];

    for (i, (name, peaks)) in samples.iter().enumerate() {
        let y = generate_spectrum(&wavenumbers, peaks, 0.005, &mut rng);
        // Alternate formats so both text loaders get exercised.
        let path = if i % 2 == 0 {
            let path = format!("{name}.csv");
            write_csv(&path, &wavenumbers, &y)?;
            path
        } else {
            let path = format!("{name}.dat");
            write_dat(&path, &wavenumbers, &y)?;
            path
        };
        println!("Wrote {} samples to {path}", wavenumbers.len());
    }

    Ok(())
}
