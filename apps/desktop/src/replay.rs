//! Recorded step-counter traces for the `cadence` command.

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use anyhow::{anyhow, Context, Result};
use shared::domain::StepSample;

pub fn read_samples(path: &Path) -> Result<Vec<StepSample>> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read samples from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read samples file '{}'", path.display()))?
    };
    parse_samples(&raw)
}

/// One `steps,millis` pair per line. Blank lines and `#` comments are skipped.
pub fn parse_samples(raw: &str) -> Result<Vec<StepSample>> {
    let mut samples = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (steps, millis) = line
            .split_once(',')
            .ok_or_else(|| anyhow!("line {}: expected 'steps,millis', got '{line}'", idx + 1))?;
        let steps = steps
            .trim()
            .parse::<u64>()
            .with_context(|| format!("line {}: invalid step count", idx + 1))?;
        let millis = millis
            .trim()
            .parse::<i64>()
            .with_context(|| format!("line {}: invalid timestamp", idx + 1))?;
        samples.push(StepSample::new(steps, millis));
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_comments() {
        let samples = parse_samples("# steps,millis\n0,0\n\n 100 , 60000 \n").expect("parse");
        assert_eq!(
            samples,
            vec![StepSample::new(0, 0), StepSample::new(100, 60_000)]
        );
    }

    #[test]
    fn reports_offending_line() {
        let err = parse_samples("0,0\n12;400\n").expect_err("bad separator");
        assert!(err.to_string().contains("line 2"));

        let err = parse_samples("-3,0\n").expect_err("negative steps");
        assert!(err.to_string().contains("line 1"));
    }
}
