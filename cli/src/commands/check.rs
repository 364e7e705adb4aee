use std::process::ExitCode;
use std::time::{Duration, Instant};

use colored::*;
use netprobe_common::config::Config;
use netprobe_core::{Pipeline, ProbeError, Stage};

use crate::terminal::{colors, print};

pub async fn check(cfg: Config, quiet: bool) -> ExitCode {
    let host: String = cfg.target.ping_host().to_string();
    let pipeline: Pipeline = Pipeline::system(cfg);

    let start_time: Instant = Instant::now();
    let outcome: Result<(), ProbeError> = pipeline.run().await;
    let elapsed: Duration = start_time.elapsed();

    match outcome {
        Ok(()) => {
            print_success(&host, elapsed, quiet);
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_failure(&err, elapsed);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Each stage gets its own exit status so scripts can tell failures apart.
pub fn exit_code(err: &ProbeError) -> u8 {
    if matches!(err, ProbeError::Timeout { .. }) {
        return 6;
    }
    match err.stage() {
        Stage::Resolve => 2,
        Stage::Ping => 3,
        Stage::Trace => 4,
        Stage::Endpoint => 5,
    }
}

fn print_success(host: &str, elapsed: Duration, quiet: bool) {
    if quiet {
        return;
    }
    let passed: ColoredString = format!("{0}/{0} stages passed", Stage::ORDER.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow();
    let output: String = format!("Path to {} is healthy: {passed} in {total_time}", host.color(colors::PRIMARY))
        .color(colors::TEXT_DEFAULT)
        .to_string();

    print::fat_separator();
    print::centerln(&output);
}

fn print_failure(err: &ProbeError, elapsed: Duration) {
    let stage: ColoredString = err.stage().name().to_uppercase().bold().red();
    let total_time: ColoredString = format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow();

    print::fat_separator();
    print::failure(&format!("{stage} stage failed after {total_time}: {err}"));
}
