use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use rand::prelude::*;

use crate::error::WorkloadError;

/// One command per non-blank line, surrounding whitespace trimmed.
pub fn parse_workload(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Reads a workload file, or stdin when `path` is `-`.
pub fn read_workload(path: &Path) -> Result<Vec<String>, WorkloadError> {
    let read_error = |source: io::Error| WorkloadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(read_error)?;
        text
    } else {
        fs::read_to_string(path).map_err(read_error)?
    };

    let commands = parse_workload(&text);
    if commands.is_empty() {
        return Err(WorkloadError::Empty);
    }
    Ok(commands)
}

/// `count` sleep commands, each short with probability `p_short`.
pub fn bernoulli_workload(
    count: usize,
    p_short: f64,
    short_ms: u64,
    long_ms: u64,
    seed: u64,
) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let run_ms = if rng.random::<f64>() < p_short {
                short_ms
            } else {
                long_ms
            };
            format!("sleep {}.{:03}", run_ms / 1000, run_ms % 1000)
        })
        .collect()
}
