use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;

use parklot::SimConfig;
use parklot::logging::init_tracing;

const USAGE: &str = "\
Usage: parklot-sim [options]

Options:
  --capacity <n>        Number of spots [default: 20]
  --vehicles <n>        Number of concurrent vehicles [default: 10]
  --kind <type>         Vehicle type: motorcycle, car or truck [default: car]
  --release <mode>      Unpark matching: category or occupant [default: category]
  --rounds <n>          Park/unpark cycles per vehicle [default: 1]
  --prefix <text>       Plate number prefix [default: KL]
  --config <file>       JSON config file (overridden by env and flags)

Environment:
  PARKLOT_CAPACITY, PARKLOT_VEHICLES, PARKLOT_VEHICLE_KIND,
  PARKLOT_RELEASE_MATCH, PARKLOT_ROUNDS, PARKLOT_PLATE_PREFIX
  PARKLOT_LOG (debug|info|warn|error), LOG_FORMAT (json)";

/// Flags in the order given, as (config key, value).
struct Args {
    config_file: Option<PathBuf>,
    overrides: Vec<(&'static str, String)>,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let args = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    init_tracing();

    if let Err(e) = run(args) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        config_file: None,
        overrides: Vec::new(),
    };

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        let flag = args[i].as_str();
        let key = match flag {
            "--capacity" => "capacity",
            "--vehicles" => "vehicles",
            "--kind" => "vehicle_kind",
            "--release" => "release_match",
            "--rounds" => "rounds",
            "--prefix" => "plate_prefix",
            "--config" => "config",
            "--help" | "-h" => return Err(String::new()),
            arg if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            arg => return Err(format!("unexpected argument: {arg}")),
        };
        i += 1;
        let value = args
            .get(i)
            .ok_or_else(|| format!("{flag} requires a value"))?
            .clone();

        if key == "config" {
            parsed.config_file = Some(PathBuf::from(value));
        } else {
            parsed.overrides.push((key, value));
        }
        i += 1;
    }

    Ok(parsed)
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config_file {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    config.apply_env()?;
    for (key, value) in &args.overrides {
        config.set(key, value)?;
    }
    config.validate()?;

    tracing::info!("parklot {}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    let lot = Arc::new(config.build_lot());
    let report = runtime.block_on(parklot::simulation::run(lot, &config))?;

    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(flags: &[&str]) -> Vec<String> {
        std::iter::once("parklot-sim")
            .chain(flags.iter().copied())
            .map(str::to_string)
            .collect()
    }

    fn usage_error(flags: &[&str]) -> String {
        parse_args(&argv(flags)).err().unwrap()
    }

    #[test]
    fn parses_flags_in_order() {
        let flags = ["--capacity", "5", "--kind", "truck", "--config", "a.json"];
        let args = parse_args(&argv(&flags)).unwrap();
        assert_eq!(args.config_file, Some(PathBuf::from("a.json")));

        let keys: Vec<&str> = args.overrides.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["capacity", "vehicle_kind"]);
        assert_eq!(args.overrides[0].1, "5");
        assert_eq!(args.overrides[1].1, "truck");
    }

    #[test]
    fn rejects_bad_usage() {
        assert_eq!(usage_error(&["--capacity"]), "--capacity requires a value");
        assert_eq!(usage_error(&["--gates", "2"]), "unknown flag: --gates");
        assert_eq!(usage_error(&["lot"]), "unexpected argument: lot");
        assert_eq!(usage_error(&["--help"]), "");
    }
}
