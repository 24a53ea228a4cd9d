use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
use parquet::arrow::ArrowWriter;

const N_RESTAURANTS: usize = 600;

/// (state, city, latitude, longitude)
const CITIES: [(&str, &str, f64, f64); 6] = [
    ("AZ", "Phoenix", 33.4484, -112.0740),
    ("NV", "Las Vegas", 36.1699, -115.1398),
    ("PA", "Philadelphia", 39.9526, -75.1652),
    ("FL", "Tampa", 27.9506, -82.4572),
    ("CA", "Santa Barbara", 34.4208, -119.6982),
    ("TN", "Nashville", 36.1627, -86.7816),
];

/// (category, share of restaurants, rating bias)
const CATEGORIES: [(&str, f64, f64); 12] = [
    ("Restaurants", 1.0, 0.0),
    ("Food", 0.35, 0.1),
    ("Mexican", 0.18, 0.1),
    ("Pizza", 0.16, -0.2),
    ("Italian", 0.14, 0.2),
    ("Chinese", 0.12, -0.3),
    ("Sushi Bars", 0.07, 0.4),
    ("Burgers", 0.12, -0.4),
    ("Bars", 0.2, 0.0),
    ("Coffee & Tea", 0.1, 0.3),
    ("Breakfast & Brunch", 0.13, 0.2),
    ("Vegan", 0.04, 0.5),
];

const NAME_PARTS: [&str; 10] = [
    "Golden", "Blue", "Rustic", "Little", "Corner", "Lucky", "Urban", "Olive", "Smoky", "Sunny",
];
const NAME_NOUNS: [&str; 8] = [
    "Spoon", "Table", "Kitchen", "Grill", "Bistro", "Cantina", "Diner", "House",
];
const STREETS: [&str; 6] = ["Main St", "Oak Ave", "2nd St", "Market St", "Elm St", "Broadway"];

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Columnar buffers for the generated table.
#[derive(Default)]
struct Columns {
    name: Vec<String>,
    address: Vec<String>,
    city: Vec<String>,
    state: Vec<String>,
    postal_code: Vec<String>,
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    stars: Vec<f64>,
    review_count: Vec<i64>,
    is_open: Vec<i64>,
    attributes: Vec<String>,
    categories: Vec<Vec<i64>>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns {
        categories: vec![Vec::with_capacity(N_RESTAURANTS); CATEGORIES.len()],
        ..Columns::default()
    };

    for i in 0..N_RESTAURANTS {
        let (state, city, lat, lon) = *rng.pick(&CITIES);

        let mut bias = 0.0;
        for (c, &(_, share, cat_bias)) in CATEGORIES.iter().enumerate() {
            let member = rng.next_f64() < share;
            if member {
                bias += cat_bias;
            }
            cols.categories[c].push(member as i64);
        }

        // Half-star ratings between 1 and 5.
        let stars = (rng.gauss(3.6 + bias, 0.7).clamp(1.0, 5.0) * 2.0).round() / 2.0;

        cols.name.push(format!(
            "{} {}",
            rng.pick(&NAME_PARTS),
            rng.pick(&NAME_NOUNS)
        ));
        cols.address
            .push(format!("{} {}", 100 + rng.next_u64() % 9900, rng.pick(&STREETS)));
        cols.city.push(city.to_string());
        cols.state.push(state.to_string());
        cols.postal_code.push(format!("{:05}", 10000 + (i * 37) % 89999));
        cols.latitude.push(lat + rng.gauss(0.0, 0.05));
        cols.longitude.push(lon + rng.gauss(0.0, 0.05));
        cols.stars.push(stars);
        cols.review_count
            .push(5 + (rng.next_f64() * rng.next_f64() * 900.0) as i64);
        cols.is_open.push((rng.next_f64() < 0.8) as i64);
        cols.attributes.push(format!(
            "{{'RestaurantsTakeOut': '{}'}}",
            rng.next_f64() < 0.7
        ));
    }
    cols
}

fn to_batch(cols: Columns) -> Result<RecordBatch> {
    let strings = |v: Vec<String>| -> ArrayRef { Arc::new(StringArray::from(v)) };

    let mut fields = vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("address", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("state", DataType::Utf8, false),
        Field::new("postal_code", DataType::Utf8, false),
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("stars", DataType::Float64, false),
        Field::new("review_count", DataType::Int64, false),
        Field::new("is_open", DataType::Int64, false),
        Field::new("attributes", DataType::Utf8, false),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        strings(cols.name),
        strings(cols.address),
        strings(cols.city),
        strings(cols.state),
        strings(cols.postal_code),
        Arc::new(Float64Array::from(cols.latitude)),
        Arc::new(Float64Array::from(cols.longitude)),
        Arc::new(Float64Array::from(cols.stars)),
        Arc::new(Int64Array::from(cols.review_count)),
        Arc::new(Int64Array::from(cols.is_open)),
        strings(cols.attributes),
    ];
    for ((name, _, _), flags) in CATEGORIES.iter().zip(cols.categories) {
        fields.push(Field::new(*name, DataType::Int64, false));
        arrays.push(Arc::new(Int64Array::from(flags)));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("Failed to create RecordBatch")
}

fn write_csv(batch: &RecordBatch, path: &PathBuf) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let schema = batch.schema();
    writer.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;
    for row in 0..batch.num_rows() {
        let record = batch
            .columns()
            .iter()
            .map(|col| arrow::util::display::array_value_to_string(col, row))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(batch: &RecordBatch, path: &PathBuf) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
        .context("Failed to create writer")?;
    writer.write(batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "data".into()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let batch = to_batch(generate(&mut rng))?;

    let csv_path = out_dir.join("restaurants.csv");
    let parquet_path = out_dir.join("restaurants.parquet");
    write_csv(&batch, &csv_path)?;
    write_parquet(&batch, &parquet_path)?;

    print_batches(&[batch.slice(0, 5)]).context("printing preview")?;
    println!(
        "Wrote {} restaurants ({} columns) to {} and {}",
        batch.num_rows(),
        batch.num_columns(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
