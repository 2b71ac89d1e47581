//! Latency benchmark against a running Stockroom server.
//!
//! Usage:
//!   benchmark id <inventory_id>
//!   benchmark search <key_name> <key_value>
//!   benchmark range <key_name> <start> <end>
//!   benchmark percentile <key_name> <percentile>
//!   benchmark update <key_name> <key_value> <val_name> <new_value>
//!
//! STOCKROOM_HOST / STOCKROOM_PORT select the server, STOCKROOM_BENCH_CALLS
//! the number of repetitions (default 100).

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

struct Operation {
    name: &'static str,
    path: &'static str,
    body: Value,
    streaming: bool,
}

fn parse_operation(args: &[String]) -> Option<Operation> {
    let arg = |i: usize| args.get(i).cloned();

    match args.first().map(String::as_str)? {
        "id" => Some(Operation {
            name: "SearchByID",
            path: "/search/id",
            body: json!({ "id": arg(1)? }),
            streaming: false,
        }),
        "search" => Some(Operation {
            name: "Search",
            path: "/search",
            body: json!({ "key_name": arg(1)?, "key_value": arg(2)? }),
            streaming: false,
        }),
        "range" => Some(Operation {
            name: "SearchRange",
            path: "/search/range",
            body: json!({
                "key_name": arg(1)?,
                "key_value_start": arg(2)?,
                "key_value_end": arg(3)?
            }),
            streaming: true,
        }),
        "percentile" => Some(Operation {
            name: "GetPercentile",
            path: "/percentile",
            body: json!({ "key_name": arg(1)?, "percentile": arg(2)?.parse::<f64>().ok()? }),
            streaming: false,
        }),
        "update" => Some(Operation {
            name: "Update",
            path: "/update",
            body: json!({
                "key_name": arg(1)?,
                "key_value": arg(2)?,
                "val_name": arg(3)?,
                "val_val_new": arg(4)?
            }),
            streaming: false,
        }),
        _ => None,
    }
}

struct BenchmarkStats {
    latencies: Vec<Duration>,
    failures: usize,
}

impl BenchmarkStats {
    fn avg_secs(&self) -> f64 {
        let sum: f64 = self.latencies.iter().map(Duration::as_secs_f64).sum();
        sum / self.latencies.len() as f64
    }

    /// Sample standard deviation in seconds
    fn std_dev_secs(&self) -> f64 {
        if self.latencies.len() < 2 {
            return 0.0;
        }
        let avg = self.avg_secs();
        let variance: f64 = self
            .latencies
            .iter()
            .map(|d| (d.as_secs_f64() - avg).powi(2))
            .sum::<f64>()
            / (self.latencies.len() - 1) as f64;
        variance.sqrt()
    }

    fn percentile(&self, p: usize) -> Duration {
        let mut sorted = self.latencies.clone();
        sorted.sort();
        sorted[(sorted.len() * p / 100).min(sorted.len() - 1)]
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let operation = match parse_operation(&args) {
        Some(op) => op,
        None => {
            eprintln!("usage: benchmark <id|search|range|percentile|update> <args...>");
            std::process::exit(2);
        }
    };

    let num_calls: usize = std::env::var("STOCKROOM_BENCH_CALLS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(100)
        .max(1);
    let host = std::env::var("STOCKROOM_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("STOCKROOM_PORT").unwrap_or_else(|_| "50051".to_string());
    let base_url = format!("http://{}:{}", host, port);

    println!("Stockroom Benchmark");
    println!("===================");
    println!("Target:     {}", base_url);
    println!("Operation:  {}", operation.name);
    println!("Calls:      {}", num_calls);
    println!();

    let client = Client::new();
    let mut stats = BenchmarkStats {
        latencies: Vec::with_capacity(num_calls),
        failures: 0,
    };
    let mut last_body = String::new();

    for _ in 0..num_calls {
        let start = Instant::now();
        let response = client
            .post(format!("{}{}", base_url, operation.path))
            .json(&operation.body)
            .send()
            .await?;
        let status = response.status();
        // Streamed results only count once fully received
        let body = response.text().await?;
        stats.latencies.push(start.elapsed());

        if !status.is_success() {
            stats.failures += 1;
        }
        last_body = body;
    }

    if operation.streaming {
        println!("Last response: {} records", last_body.lines().count());
    } else {
        println!("Last response: {}", last_body);
    }
    println!();
    println!("  Failures:    {}", stats.failures);
    println!("  Average:     {:.6} s", stats.avg_secs());
    println!("  Std dev:     {:.6} s", stats.std_dev_secs());
    println!(
        "  Latency:     min={:?} p50={:?} p99={:?} max={:?}",
        stats.percentile(0),
        stats.percentile(50),
        stats.percentile(99),
        stats.percentile(100)
    );

    Ok(())
}
