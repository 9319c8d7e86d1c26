use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use flatmem::{flat_scalar, Builder, FlatLayout, Tuple, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use tracing_subscriber::EnvFilter;

const ENV_VAR_ROWS: &str = "FLATMEM_DEMO_ROWS";
const ENV_VAR_SEED: &str = "FLATMEM_DEMO_SEED";
const DEFAULT_ROWS: usize = 4;

#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
struct Reading {
    celsius: f32,
    humidity: f32,
}
flat_scalar!(Reading);

/// station id, station name, readings
type Station = Tuple<(u64, Vector<u8>, Vector<Reading>)>;
/// format version, stations
type Report = Tuple<(u16, Vector<Station>)>;

fn env_or<T: std::str::FromStr>(key: &str, default: impl FnOnce() -> T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key).map_or_else(
        |_| Ok(default()),
        |s| s.parse().with_context(|| format!("parsing {key}={s}")),
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rows: usize = env_or(ENV_VAR_ROWS, || DEFAULT_ROWS)?;
    let seed: u64 = env_or(ENV_VAR_SEED, rand::random)?;
    let mut rng = StdRng::seed_from_u64(seed);
    tracing::info!(rows, seed, "building report");

    let mut builder = Builder::<Report>::new();
    *builder.field_mut::<0>() = 1;
    let stations = builder.field_mut::<1>();
    for id in 0..rows as u64 {
        let station = stations.push_default();
        *station.field_mut::<0>() = id;
        station
            .field_mut::<1>()
            .extend(format!("station-{id}").into_bytes());
        for _ in 0..rng.gen_range(1..6) {
            station.field_mut::<2>().push(Reading {
                celsius: rng.gen_range(-10.0..35.0),
                humidity: rng.gen_range(0.0..1.0),
            });
        }
    }
    builder.finish()?;

    let layout = FlatLayout::of::<Report>();
    tracing::info!(
        size = builder.size(),
        align = layout.final_alignment,
        header = layout.fixed_size,
        "report finished"
    );

    let report = builder.view();
    for station in report.field::<1>().iter() {
        let name = String::from_utf8_lossy(station.field::<1>().as_slice());
        let readings = station.field::<2>().as_slice();
        let mean = readings.iter().map(|r| r.celsius).sum::<f32>() / readings.len() as f32;
        println!(
            "{:>3} {:<12} {} readings, mean {:.1} C",
            station.field::<0>(),
            name,
            readings.len(),
            mean
        );
    }

    Ok(())
}
