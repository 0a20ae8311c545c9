//! Benchmark runner for the multiplication strategies.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use matbench::report::BenchmarkReport;
use matbench::select::{self, OrderVisitor, Selection};
use matbench::{DataType, Element, EngineConfig, Matrix, MultType};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "matbench", about = "Benchmark dense matrix multiplication strategies")]
struct Args {
    /// Square orders to run (2, 128, 256, 512, 1024)
    #[arg(short, long, value_delimiter = ',', default_values_t = vec![128, 256])]
    orders: Vec<usize>,

    /// Strategies to run
    #[arg(short, long, value_delimiter = ',', default_values_t = MultType::CPU.to_vec())]
    strategies: Vec<MultType>,

    /// Element types to run (int32, uint32, float, double)
    #[arg(short = 't', long, value_delimiter = ',', default_values_t = vec![DataType::Float])]
    types: Vec<DataType>,

    /// Timed iterations per cell (after one warm-up run)
    #[arg(short, long, default_value_t = 3)]
    iterations: usize,

    /// Seed for the left operand; the right one uses seed + 1
    #[arg(long, default_value_t = matbench::matrix::DEFAULT_SEED)]
    seed: u64,

    /// Directory holding mat_mult.cl
    #[arg(long)]
    kernels_dir: Option<PathBuf>,

    /// Directory for compiled kernel binaries
    #[arg(long)]
    binary_dir: Option<PathBuf>,

    /// Thread count for MultithreadSimd (default: max(4, cpus))
    #[arg(long)]
    threads: Option<usize>,

    /// Print one JSON report per cell instead of the tables
    #[arg(long)]
    json: bool,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(dir) = &self.kernels_dir {
            config = config.with_kernels_dir(dir);
        }
        if let Some(dir) = &self.binary_dir {
            config = config.with_binary_dir(dir);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        config
    }
}

/// Mean time and throughput of one benchmark cell.
#[derive(Debug, Clone, Copy)]
struct Timing {
    avg_seconds: f64,
    time_ms: f64,
    gflops: f64,
}

/// Fills both operands, runs one warm-up product, then times `iterations` more.
struct BenchRun<'a> {
    config: &'a EngineConfig,
    iterations: usize,
    seed: u64,
}

impl OrderVisitor for BenchRun<'_> {
    type Output = Timing;

    fn visit<T: Element, const N: usize>(&mut self, mult: MultType) -> matbench::Result<Timing> {
        let mut a = Matrix::<T, N, N>::new();
        let mut b = Matrix::<T, N, N>::new();
        a.random_fill_seeded(self.seed);
        b.random_fill_seeded(self.seed.wrapping_add(1));

        prepare_device::<T>(mult, self.config)?;

        // Warmup
        a.mult_with(&b, mult, self.config)?;

        let mut total = 0.0;
        for _ in 0..self.iterations {
            let start = Instant::now();
            let c = a.mult_with(&b, mult, self.config)?;
            total += start.elapsed().as_secs_f64();
            std::hint::black_box(c);
        }

        let avg = total / self.iterations as f64;
        let gflops = 2.0 * (N * N * N) as f64 / avg / 1e9;
        Ok(Timing {
            avg_seconds: avg,
            time_ms: avg * 1000.0,
            gflops,
        })
    }
}

/// Compiles and caches the device binary outside the timed region.
#[cfg(feature = "opencl")]
fn prepare_device<T: Element>(mult: MultType, config: &EngineConfig) -> matbench::Result<()> {
    if mult == MultType::Gpu {
        matbench::prepare_gpu_binary::<T>(config)?;
    }
    Ok(())
}

#[cfg(not(feature = "opencl"))]
fn prepare_device<T: Element>(_mult: MultType, _config: &EngineConfig) -> matbench::Result<()> {
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    anyhow::ensure!(args.iterations > 0, "--iterations must be at least 1");
    let config = args.engine_config();

    let cells = Selection::grid(&args.orders, &args.strategies, &args.types)
        .context("invalid benchmark selection")?;
    info!(cells = cells.len(), iterations = args.iterations, "starting benchmark");

    let mut run = BenchRun {
        config: &config,
        iterations: args.iterations,
        seed: args.seed,
    };

    if args.json {
        for cell in cells {
            let timing = select::dispatch(&mut run, cell)
                .with_context(|| format!("{} {} {}", cell.mult, cell.dtype, cell.order))?;
            let report = BenchmarkReport::new(cell, args.iterations, timing.avg_seconds);
            println!("{}", report.to_json_pretty()?);
        }
        return Ok(());
    }

    println!("=== Matrix Multiplication Benchmark ===\n");
    println!(
        "CPU Features: AVX2={}, threads={}\n",
        matbench::kernels::has_avx2(),
        config.simd_threads()
    );

    let mut results: Vec<(Selection, Timing)> = Vec::with_capacity(cells.len());
    for order in &args.orders {
        println!("Matrix: {}×{}", order, order);
        println!("{}", "-".repeat(60));

        let mut index = 0;
        for cell in cells.iter().filter(|c| c.order == *order) {
            let timing = select::dispatch(&mut run, *cell)
                .with_context(|| format!("{} {} {}×{}", cell.mult, cell.dtype, order, order))?;
            let baseline = results
                .iter()
                .find(|(s, _)| s.order == *order && s.dtype == cell.dtype)
                .map(|(_, t)| t.time_ms)
                .unwrap_or(timing.time_ms);

            index += 1;
            println!(
                "{}. {:20} {:8} {:10.3} ms  {:8.2} GFLOPS  ({:.1}×)",
                index,
                cell.mult.to_string(),
                cell.dtype.to_string(),
                timing.time_ms,
                timing.gflops,
                baseline / timing.time_ms
            );
            results.push((*cell, timing));
        }
        println!();
    }

    print_summary_table(&args.orders, &results);
    Ok(())
}

fn print_summary_table(orders: &[usize], results: &[(Selection, Timing)]) {
    println!("{}", "=".repeat(90));
    println!("SUMMARY (GFLOPS)");
    println!("{}", "=".repeat(90));

    print!("\n{:<30}", "Method");
    for order in orders {
        print!(" {:>12}", format!("{}×{}", order, order));
    }
    println!();
    println!("{}", "-".repeat(90));

    let mut rows: Vec<(MultType, DataType)> = Vec::new();
    for (sel, _) in results {
        if !rows.contains(&(sel.mult, sel.dtype)) {
            rows.push((sel.mult, sel.dtype));
        }
    }

    for (mult, dtype) in rows {
        print!("{:<30}", format!("{} ({})", mult, dtype));
        for order in orders {
            let cell = results
                .iter()
                .find(|(s, _)| s.mult == mult && s.dtype == dtype && s.order == *order);
            match cell {
                Some((_, t)) => print!(" {:>9.2} GF", t.gflops),
                None => print!(" {:>12}", "-"),
            }
        }
        println!();
    }

    println!("{}", "=".repeat(90));
    println!("\nGF = GFLOPS (billion operations per second)");
    println!("Speedup is relative to the first strategy listed for each type. Higher is better.\n");
}
