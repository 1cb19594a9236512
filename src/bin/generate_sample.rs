use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};

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

    fn choose<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Typical sales level and margin per category; margins can dip negative.
const CATEGORIES: [(&str, f64, f64); 4] = [
    ("Electronics", 45_000.0, 0.12),
    ("Clothing", 18_000.0, 0.22),
    ("Food", 9_000.0, 0.08),
    ("Home", 24_000.0, 0.15),
];

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("valid start date")?;
    let days = 365u64;
    let rows_per_day = 3;

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["date", "category", "region", "sales", "profit"])?;

    let mut rows = 0u64;
    for offset in 0..days {
        let date = start
            .checked_add_days(Days::new(offset))
            .context("date overflow")?;

        // Weekend uplift plus a mild seasonal swing across the year.
        let weekday_factor = match date.weekday() {
            Weekday::Sat | Weekday::Sun => 1.4,
            _ => 1.0,
        };
        let seasonal = 1.0 + 0.2 * (offset as f64 / days as f64 * std::f64::consts::TAU).sin();

        for _ in 0..rows_per_day {
            let (category, base_sales, base_margin) =
                CATEGORIES[(rng.next_u64() % CATEGORIES.len() as u64) as usize];
            let region = rng.choose(&REGIONS);

            let sales = (rng.gauss(base_sales, base_sales * 0.25) * weekday_factor * seasonal)
                .max(0.0)
                .round();
            let margin = rng.gauss(base_margin, 0.08);
            let profit = (sales * margin).round();

            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                category.to_string(),
                region.to_string(),
                format!("{sales}"),
                format!("{profit}"),
            ])?;
            rows += 1;
        }
    }

    writer.flush().context("flushing CSV")?;
    println!("Wrote {rows} records to {output_path}");
    Ok(())
}
