use anyhow::{Context, Result};

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

    /// Uniform float in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Pick one element of a non-empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let suppliers = ["Supplier 1", "Supplier 2", "Supplier 3", "Supplier 4", "Supplier 5", "Supplier 6"];
    let products = ["haircare", "skincare", "cosmetics"];
    let origins = ["Mumbai", "Kolkata", "Delhi", "Bangalore", "Chennai"];
    let destinations = ["Delhi", "Chennai", "Mumbai", "Kolkata", "Hyderabad"];

    let output_path = "supply_chain_data.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;

    // Raw header on purpose: mixed case and spaces exercise the
    // normalizer the same way the real export does.
    writer.write_record([
        "Supplier name",
        "Product type",
        "Origin",
        "Destination",
        "Revenue generated",
        "Costs",
        "Production volumes",
        "Lead time",
        "Number of products sold",
    ])?;

    let n_rows = 120;
    for row in 0..n_rows {
        let supplier = rng.pick(&suppliers);
        let product = rng.pick(&products);
        let origin = rng.pick(&origins);
        let destination = rng.pick(&destinations);

        let revenue = rng.range(1000.0, 10000.0);
        let volume = rng.range(100.0, 1000.0).round();
        let lead_time = rng.range(1.0, 30.0).round();
        let sold = rng.range(50.0, 1000.0).round();

        // Every ~20th cost is unexportable junk so the dashboard's
        // coerce-to-missing path gets real data to chew on.
        let costs = if row % 20 == 19 {
            "n/a".to_string()
        } else {
            format!("{:.2}", rng.range(50.0, 600.0))
        };

        writer.write_record([
            supplier.to_string(),
            product.to_string(),
            origin.to_string(),
            destination.to_string(),
            format!("{revenue:.2}"),
            costs,
            format!("{volume}"),
            format!("{lead_time}"),
            format!("{sold}"),
        ])?;
    }

    writer.flush().context("flushing CSV")?;
    println!("Wrote {n_rows} records to {output_path}");
    Ok(())
}
