use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic relay-experiment data set in the layout swarm-plot reads.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Destination directory
    #[arg(default_value = "output/boids_relay")]
    out_dir: PathBuf,

    /// Time steps per entity (one per second)
    #[arg(long, default_value_t = 101)]
    steps: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const ENTITIES: usize = 8;
const ENEMY: usize = 7;

#[derive(Serialize)]
struct PositionRow {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Serialize)]
struct DistanceRow {
    time: f64,
    distance: f64,
}

#[derive(Serialize)]
struct VelocityRow {
    time: f64,
    velocity: f64,
}

#[derive(Serialize)]
struct TotalRxRow {
    time: f64,
    total_rx: u64,
}

/// SplitMix64 stream with polar-method normals; reproducible per seed.
struct Noise {
    state: u64,
    spare: Option<f64>,
}

impl Noise {
    fn new(seed: u64) -> Self {
        Noise { state: seed, spare: None }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return mean + std_dev * z;
        }
        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let k = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * k);
                return mean + std_dev * u * k;
            }
        }
    }
}

/// Base stations sit still, relays drift along the line between them with a
/// slow climb, the enemy circles overhead.
fn simulate(steps: usize, rng: &mut Noise) -> Vec<Vec<[f64; 3]>> {
    let mut tracks: Vec<Vec<[f64; 3]>> = vec![Vec::with_capacity(steps); ENTITIES];
    let mut relays: Vec<[f64; 3]> = (2..ENEMY)
        .map(|i| [-100.0 + 40.0 * (i - 1) as f64, rng.normal(0.0, 10.0), 20.0])
        .collect();

    for t in 0..steps {
        tracks[0].push([-120.0, 0.0, 0.0]);
        tracks[1].push([120.0, 0.0, 0.0]);
        for (k, pos) in relays.iter_mut().enumerate() {
            pos[0] += rng.normal(0.0, 1.5);
            pos[1] += rng.normal(-0.05 * pos[1], 1.5);
            pos[2] = (pos[2] + rng.normal(0.25, 0.5)).max(0.0);
            tracks[k + 2].push(*pos);
        }
        let angle = t as f64 * 0.08;
        tracks[ENEMY].push([150.0 * angle.cos(), 150.0 * angle.sin(), 60.0]);
    }
    tracks
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter().zip(b).map(|(p, q)| (p - q).powi(2)).sum::<f64>().sqrt()
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = Noise::new(args.seed);
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let out = |name: String| args.out_dir.join(name);

    let tracks = simulate(args.steps, &mut rng);

    for (id, track) in tracks.iter().enumerate() {
        write_rows(
            &out(format!("boids_relay-position-{id}.csv")),
            track.iter().map(|&[x, y, z]| PositionRow { x, y, z }),
        )?;
    }

    let chain = [(0, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1)];
    let enemy: Vec<(usize, usize)> = (2..ENEMY).map(|u| (u, ENEMY)).collect();
    for &(u, v) in chain.iter().chain(&enemy) {
        write_rows(
            &out(format!("boids_relay-distance-{u}-{v}.csv")),
            tracks[u]
                .iter()
                .zip(&tracks[v])
                .enumerate()
                .map(|(t, (&a, &b))| DistanceRow {
                    time: t as f64,
                    distance: distance(a, b),
                }),
        )?;
    }

    for id in 2..ENEMY {
        write_rows(
            &out(format!("boids_relay-velocity-{id}.csv")),
            tracks[id].windows(2).enumerate().map(|(t, w)| VelocityRow {
                time: (t + 1) as f64,
                velocity: distance(w[0], w[1]),
            }),
        )?;
    }

    let mut total = 0u64;
    let rx_rows: Vec<TotalRxRow> = (0..args.steps)
        .map(|t| {
            total += 20_000 + (rng.uniform() * 20_000.0) as u64;
            TotalRxRow {
                time: t as f64,
                total_rx: total,
            }
        })
        .collect();
    write_rows(&out("boids_relay-total_rx.csv".to_string()), rx_rows)?;

    // Parameter sweep summary: no header, ws,wa,wc,dist,enemy,ploss.
    let path = out("boids_relay.csv".to_string());
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    let grid = [0.1, 0.3, 0.5, 0.7, 0.9];
    let mut runs = 0;
    for &ws in &grid {
        for &wa in &grid {
            for &wc in &grid {
                let ploss = (0.6 * wc - 0.3 * ws + 0.1 * wa + rng.normal(0.3, 0.05)).clamp(0.0, 1.0);
                writer.serialize((ws, wa, wc, 35.0, 1, ploss))?;
                runs += 1;
            }
        }
    }
    writer.flush()?;

    println!(
        "Wrote {ENTITIES} position series ({} steps each) and {runs} sweep rows to {}",
        args.steps,
        args.out_dir.display()
    );
    Ok(())
}
