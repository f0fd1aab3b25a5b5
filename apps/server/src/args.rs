use std::env;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct CliArgs {
    /// Raw `--port` value; validated together with the configured port.
    pub port: Option<String>,
    pub config: Option<PathBuf>,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(env::args().skip(1))
}

fn parse_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --port".to_string())?;
                parsed.port = Some(value);
            }
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_string())?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "Billiard table usage ledger\n\n\
Usage:\n  billiard-ledger [--config <file>] [--port <port>]\n\n\
Options:\n  --config <file>  Read settings from a TOML file (environment variables still override)\n  --port <port>    Override the configured port for this run only\n  -h, --help       Show this help message\n\n\
Environment:\n  LEDGER_DATABASE, NUM_TABLES, DURATION_TOLERANCE_MINUTES, ALLOWED_ORIGINS,\n  API_TOKEN, PORT, RECORD_DAY, RETRY_DELAY_MS, RUST_LOG or LOG_LEVEL\n"
    );
}
