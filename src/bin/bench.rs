//! CLI benchmark harness.
//!
//! Grounded on `examples/benchmark.rs`'s stress-test shape (scenarios
//! measured with `Instant::now()`, ns/op and FPS-style stats printed out),
//! but the ad hoc argument parsing there is replaced with `clap` derive,
//! matching the rest of the pack's CLI conventions.

use std::io::Write;
use std::time::{Duration, Instant};

use clap::Parser;

use weft::{
    buffer::Buffer,
    context::Context,
    node::{Node, NumberSource},
    pool::BufferPool,
    program::SerializedProgram,
};

/// Stress-test the rendering pipeline and report frame-time percentiles.
#[derive(Parser, Debug)]
#[command(name = "weft-bench", version)]
struct Args {
    /// How long to run, in seconds.
    #[arg(short = 'd', long = "duration", default_value_t = 3)]
    duration_secs: u64,

    /// Number of ForEach rows to render.
    #[arg(long = "items", default_value_t = 1000)]
    items: usize,

    /// Width of the progress bar under test.
    #[arg(long = "bar", default_value_t = 20)]
    bar_width: u16,

    /// Engage the buffer pool's background clear worker; must produce
    /// byte-identical output to synchronous clearing.
    #[arg(long = "async", default_value_t = true)]
    r#async: bool,

    /// Print a human-readable summary instead of the raw percentile line.
    #[arg(long = "visual", default_value_t = false)]
    visual: bool,
}

struct Stats {
    frames: u64,
    total: Duration,
    min: Duration,
    max: Duration,
    samples: Vec<Duration>,
}

impl Stats {
    fn new() -> Self {
        Self { frames: 0, total: Duration::ZERO, min: Duration::MAX, max: Duration::ZERO, samples: Vec::new() }
    }

    fn record(&mut self, d: Duration) {
        self.frames += 1;
        self.total += d;
        self.min = self.min.min(d);
        self.max = self.max.max(d);
        self.samples.push(d);
    }

    fn percentile(&self, p: f64) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted = self.samples.clone();
        sorted.sort();
        let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
        sorted[idx]
    }

    fn avg(&self) -> Duration {
        if self.frames == 0 {
            Duration::ZERO
        } else {
            self.total / self.frames as u32
        }
    }
}

fn build_view(items: usize, bar_width: u16, ctx: &mut Context) -> (Node, crate::arena_handles::Handles) {
    let progress = ctx.bind_number(0.0);
    let rows: Vec<String> = (0..items).map(|i| format!("row-{i}")).collect();
    let list = ctx.bind_list(rows);

    let view = Node::col(vec![
        Node::progress(NumberSource::Bound(progress), bar_width),
        Node::for_each(list, || {
            Node::Text {
                source: weft::node::TextSource::ForEachItem,
                style: weft::cell::Style::default(),
                layout: weft::node::Layout::default(),
            }
        }),
    ]);

    (view, crate::arena_handles::Handles { progress, list })
}

mod arena_handles {
    use weft::arena::Handle;

    pub struct Handles {
        pub progress: Handle<f64>,
        #[allow(dead_code)]
        pub list: Handle<Vec<String>>,
    }
}

fn run(args: &Args) -> weft::Result<Stats> {
    let width = 120u16;
    let height = 40u16;

    let mut ctx = Context::new();
    let (view, handles) = build_view(args.items, args.bar_width, &mut ctx);
    let mut program = SerializedProgram::compile(&view, width, height)?;

    let mut pool = BufferPool::new(width, height)?;
    let mut displayed = Buffer::new(width, height)?;
    let mut stats = Stats::new();

    let deadline = Instant::now() + Duration::from_secs(args.duration_secs);
    let mut tick: u64 = 0;

    while Instant::now() < deadline {
        let frame_start = Instant::now();

        let value = (tick % 100) as f64;
        ctx.numbers.set(handles.progress, value);

        let current = if args.r#async {
            pool.swap()?
        } else {
            pool.current_mut().clear_dirty();
            pool.current()
        };
        let mut scratch = current.clone();
        program.execute(&mut scratch, width, height, &ctx)?;
        *pool.current_mut() = scratch;

        let mut patch = String::new();
        weft::differ::diff_and_sync(pool.current_mut(), &mut displayed, &mut patch);

        stats.record(frame_start.elapsed());
        tick += 1;
    }

    pool.stop()?;
    Ok(stats)
}

fn main() {
    weft::logging::init();
    let args = Args::parse();

    match run(&args) {
        Ok(stats) => {
            let stderr = std::io::stderr();
            let mut out = stderr.lock();
            if args.visual {
                let _ = writeln!(
                    out,
                    "frames={} avg={:?} min={:?} max={:?} p50={:?} p90={:?} p95={:?} p99={:?}",
                    stats.frames,
                    stats.avg(),
                    stats.min,
                    stats.max,
                    stats.percentile(0.50),
                    stats.percentile(0.90),
                    stats.percentile(0.95),
                    stats.percentile(0.99),
                );
            } else {
                let _ = writeln!(
                    out,
                    "{}\t{:?}\t{:?}\t{:?}\t{:?}\t{:?}\t{:?}\t{:?}",
                    stats.frames,
                    stats.avg(),
                    stats.min,
                    stats.max,
                    stats.percentile(0.50),
                    stats.percentile(0.90),
                    stats.percentile(0.95),
                    stats.percentile(0.99),
                );
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("weft-bench: {e}");
            std::process::exit(1);
        }
    }
}
