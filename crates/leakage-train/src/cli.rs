//! Command-line parsing for the `leakage-train` binary.

use std::path::PathBuf;

use leakage_storage::StorageUri;

use crate::pipeline::{TrainConfig, DEFAULT_DATA_PATH};

#[derive(Debug, Clone)]
pub enum Command {
    Train(TrainConfig),
    Help,
}

/// Parses arguments (without the program name).
///
/// The output path is parsed here so a malformed destination fails before any
/// data is read.
pub fn parse_args(args: Vec<String>) -> Result<Command, String> {
    let mut output: Option<StorageUri> = None;
    let mut data_path = PathBuf::from(DEFAULT_DATA_PATH);
    let mut scratch_dir = PathBuf::from(".");
    let mut model_version = "v1".to_string();
    let mut seed: Option<u64> = None;
    let mut trees: Option<usize> = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--gcs-output-path" => {
                idx += 1;
                let value = value(&args, idx, "--gcs-output-path")?;
                let uri = value
                    .parse::<StorageUri>()
                    .map_err(|err| format!("Invalid --gcs-output-path: {err}"))?;
                output = Some(uri);
            }
            "--data" => {
                idx += 1;
                data_path = PathBuf::from(value(&args, idx, "--data")?);
            }
            "--scratch-dir" => {
                idx += 1;
                scratch_dir = PathBuf::from(value(&args, idx, "--scratch-dir")?);
            }
            "--model-version" => {
                idx += 1;
                let value = value(&args, idx, "--model-version")?;
                if value.trim().is_empty() {
                    return Err("--model-version must not be empty".to_string());
                }
                model_version = value.to_string();
            }
            "--seed" => {
                idx += 1;
                let value = value(&args, idx, "--seed")?;
                seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            "--trees" => {
                idx += 1;
                let value = value(&args, idx, "--trees")?;
                let n = value
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| format!("Invalid --trees value: {value}"))?;
                trees = Some(n);
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let output = output.ok_or_else(|| format!("--gcs-output-path is required\n\n{}", help_text()))?;
    let mut config = TrainConfig::new(output);
    config.data_path = data_path;
    config.scratch_dir = scratch_dir;
    config.model_version = model_version;
    if let Some(seed) = seed {
        config.forest.seed = seed;
    }
    if let Some(trees) = trees {
        config.forest.n_trees = trees;
    }
    Ok(Command::Train(config))
}

fn value<'a>(args: &'a [String], idx: usize, flag: &str) -> Result<&'a str, String> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

pub fn help_text() -> String {
    [
        "leakage-train",
        "",
        "Trains the claims leakage random forest and uploads the model artifact.",
        "",
        "Usage:",
        "  leakage-train --gcs-output-path <gs://bucket/key> [options]",
        "",
        "Options:",
        "  --gcs-output-path <uri>  Destination, gs://bucket/key or file:///path (required).",
        "  --data <file>            Training CSV (default: data/leakage_data.csv).",
        "  --scratch-dir <dir>      Where model.json is written before upload (default: .).",
        "  --model-version <s>      Version reported by the API (default: v1).",
        "  --seed <u64>             Split and forest seed (default: 42).",
        "  --trees <n>              Number of trees (default: 200).",
        "  -h, --help               Show this help.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let Command::Train(config) = parse_args(args(&["--gcs-output-path", "gs://models/claims.json"])).unwrap()
        else {
            panic!("expected train command");
        };
        assert_eq!(
            config.output,
            StorageUri::Gcs { bucket: "models".into(), key: "claims.json".into() }
        );
        assert_eq!(config.data_path, PathBuf::from("data/leakage_data.csv"));
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.forest.n_trees, 200);
        assert_eq!(config.model_version, "v1");
    }

    #[test]
    fn test_overrides() {
        let Command::Train(config) = parse_args(args(&[
            "--gcs-output-path",
            "file:///tmp/model.json",
            "--data",
            "claims.csv",
            "--seed",
            "7",
            "--trees",
            "50",
            "--model-version",
            "2026-10",
        ]))
        .unwrap() else {
            panic!("expected train command");
        };
        assert_eq!(config.data_path, PathBuf::from("claims.csv"));
        assert_eq!(config.forest.seed, 7);
        assert_eq!(config.forest.n_trees, 50);
        assert_eq!(config.model_version, "2026-10");
    }

    #[test]
    fn test_output_path_required() {
        let err = parse_args(args(&["--data", "x.csv"])).unwrap_err();
        assert!(err.contains("--gcs-output-path is required"));
    }

    #[test]
    fn test_malformed_output_path_rejected() {
        let err = parse_args(args(&["--gcs-output-path", "s3://bucket/key"])).unwrap_err();
        assert!(err.contains("gs://"));
    }

    #[test]
    fn test_help_and_unknown() {
        assert!(matches!(parse_args(args(&["--help"])), Ok(Command::Help)));
        assert!(parse_args(args(&["--bogus"])).unwrap_err().contains("Unknown argument"));
        assert!(parse_args(args(&["--trees", "0"])).is_err());
    }
}
