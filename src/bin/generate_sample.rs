use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// `(country, region)` pairs the sample is drawn for.
const COUNTRIES: [(&str, &str); 40] = [
    ("Argentina", "Americas"),
    ("Australia", "Western Pacific"),
    ("Bangladesh", "South-East Asia"),
    ("Belgium", "Europe"),
    ("Brazil", "Americas"),
    ("Canada", "Americas"),
    ("Chile", "Americas"),
    ("China", "Western Pacific"),
    ("Colombia", "Americas"),
    ("Egypt", "Eastern Mediterranean"),
    ("Ethiopia", "Africa"),
    ("France", "Europe"),
    ("Germany", "Europe"),
    ("Ghana", "Africa"),
    ("India", "South-East Asia"),
    ("Indonesia", "South-East Asia"),
    ("Iran", "Eastern Mediterranean"),
    ("Iraq", "Eastern Mediterranean"),
    ("Italy", "Europe"),
    ("Japan", "Western Pacific"),
    ("Kenya", "Africa"),
    ("Mexico", "Americas"),
    ("Morocco", "Eastern Mediterranean"),
    ("Nepal", "South-East Asia"),
    ("Netherlands", "Europe"),
    ("New Zealand", "Western Pacific"),
    ("Nigeria", "Africa"),
    ("Pakistan", "Eastern Mediterranean"),
    ("Peru", "Americas"),
    ("Philippines", "Western Pacific"),
    ("Poland", "Europe"),
    ("Russia", "Europe"),
    ("Saudi Arabia", "Eastern Mediterranean"),
    ("South Africa", "Africa"),
    ("Spain", "Europe"),
    ("Sweden", "Europe"),
    ("Thailand", "South-East Asia"),
    ("Turkey", "Europe"),
    ("United Kingdom", "Europe"),
    ("Vietnam", "Western Pacific"),
];

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

struct Row {
    country: &'static str,
    region: &'static str,
    confirmed: i64,
    deaths: i64,
    /// Left blank for some rows so the loader's null handling shows up.
    recovered: Option<i64>,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    COUNTRIES
        .iter()
        .enumerate()
        .map(|(i, &(country, region))| {
            // Log-uniform between 10^3 and 10^6.5 cases.
            let confirmed = 10f64.powf(rng.uniform(3.0, 6.5)).round() as i64;
            let deaths = (confirmed as f64 * rng.uniform(0.005, 0.06)).round() as i64;
            let recovered = (confirmed as f64 * rng.uniform(0.55, 0.95)).round() as i64;
            Row {
                country,
                region,
                confirmed,
                deaths,
                recovered: (i % 13 != 7).then_some(recovered),
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "Country/Region",
        "Confirmed",
        "Deaths",
        "Recovered",
        "Active",
        "Region",
    ])?;
    for r in rows {
        let active = r.confirmed - r.deaths - r.recovered.unwrap_or(0);
        writer.write_record([
            r.country.to_string(),
            r.confirmed.to_string(),
            r.deaths.to_string(),
            r.recovered.map(|v| v.to_string()).unwrap_or_default(),
            active.to_string(),
            r.region.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Country/Region", DataType::Utf8, false),
        Field::new("Confirmed", DataType::Int64, false),
        Field::new("Deaths", DataType::Int64, false),
        Field::new("Recovered", DataType::Int64, true),
        Field::new("Region", DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.country))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.confirmed))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.deaths))),
        Arc::new(Int64Array::from_iter(rows.iter().map(|r| r.recovered))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.region))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| ".".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = out_dir.join("country_wise_latest_covid.csv");
    write_csv(&csv_path, &rows)?;
    let parquet_path = out_dir.join("country_wise_latest_covid.parquet");
    write_parquet(&parquet_path, &rows)?;

    log::info!("sample written to {}", out_dir.display());
    println!(
        "Wrote {} countries to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
