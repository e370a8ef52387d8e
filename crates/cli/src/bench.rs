// Wall-clock timing of writer variants

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use serde::Serialize;
use xlbench_io::{Variant, WriteOptions};
use xlbench_table::Record;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantTiming {
    pub variant: String,
    pub iterations: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub output_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub data: String,
    pub records: usize,
    pub warmup: u32,
    pub results: Vec<VariantTiming>,
}

/// Run `variant` `warmup` times untimed, then `iterations` times timed.
pub fn time_variant<R: Record>(
    variant: Variant,
    records: &[R],
    options: &WriteOptions,
    warmup: u32,
    iterations: u32,
) -> Result<VariantTiming, xlbench_io::Error> {
    for _ in 0..warmup {
        variant.run(records, options)?;
    }

    let mut samples = Vec::with_capacity(iterations as usize);
    let mut output_bytes = 0;
    for _ in 0..iterations {
        let start = Instant::now();
        let bytes = variant.run(records, options)?;
        samples.push(start.elapsed());
        output_bytes = bytes.len();
    }

    let timing = summarize(variant, &samples, output_bytes);
    log::info!(
        "{}: mean {:.2} ms over {} runs",
        timing.variant,
        timing.mean_ms,
        timing.iterations
    );
    Ok(timing)
}

pub fn summarize(variant: Variant, samples: &[Duration], output_bytes: usize) -> VariantTiming {
    let ms: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
    let mean_ms = if ms.is_empty() {
        0.0
    } else {
        ms.iter().sum::<f64>() / ms.len() as f64
    };
    VariantTiming {
        variant: variant.name().to_string(),
        iterations: ms.len(),
        mean_ms,
        min_ms: ms.iter().copied().reduce(f64::min).unwrap_or(0.0),
        max_ms: ms.iter().copied().reduce(f64::max).unwrap_or(0.0),
        output_bytes,
    }
}

/// Plain-text summary table.
pub fn render_table(report: &BenchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} records from {} ({} warmup run(s))",
        report.records, report.data, report.warmup
    );
    let _ = writeln!(
        out,
        "{:<18} {:>6} {:>11} {:>11} {:>11} {:>12}",
        "variant", "runs", "mean ms", "min ms", "max ms", "bytes"
    );
    for r in &report.results {
        let _ = writeln!(
            out,
            "{:<18} {:>6} {:>11.2} {:>11.2} {:>11.2} {:>12}",
            r.variant, r.iterations, r.mean_ms, r.min_ms, r.max_ms, r.output_bytes
        );
    }
    out
}
