use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// Concurrent in-memory bank ledger server
#[derive(Parser, Debug)]
#[command(name = "bank-server")]
#[command(about = "Serve a concurrent in-memory bank ledger over TCP", long_about = None)]
pub struct CliArgs {
    /// JSON configuration file
    #[arg(
        long = "config",
        value_name = "FILE",
        help = "Path to a JSON config file (default: ./config.json if present)"
    )]
    pub config: Option<PathBuf>,

    #[arg(long = "host", value_name = "HOST", help = "Interface to listen on")]
    pub host: Option<String>,

    #[arg(long = "port", value_name = "PORT", help = "TCP port to listen on")]
    pub port: Option<u16>,

    #[arg(
        long = "interest-rate",
        value_name = "RATE",
        allow_negative_numbers = true,
        help = "Loan interest rate per application (e.g. 0.05)"
    )]
    pub interest_rate: Option<f64>,

    #[arg(
        long = "interest-interval",
        value_name = "SECONDS",
        help = "Seconds between automatic interest runs, 0 disables them"
    )]
    pub interest_interval: Option<u64>,

    #[arg(
        long = "delay-ms",
        value_name = "MILLIS",
        help = "Artificial pause inside every mutating critical section"
    )]
    pub delay_ms: Option<u64>,

    /// Tokio worker threads
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    #[arg(
        long = "log-level",
        value_name = "FILTER",
        default_value = "info",
        help = "Log filter used when RUST_LOG is not set"
    )]
    pub log_level: String,
}

impl CliArgs {
    /// Overwrite file values with the flags that were given
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(rate) = self.interest_rate {
            config.interest_rate = rate;
        }
        if let Some(interval) = self.interest_interval {
            config.auto_interest_interval = interval;
        }
        if let Some(delay) = self.delay_ms {
            config.critical_section_delay_ms = delay;
        }
    }

    /// Worker thread count, falling back to the CPU count when unset or zero
    pub fn worker_threads(&self) -> usize {
        match self.workers {
            Some(0) => {
                warn!("--workers 0 is invalid, using CPU count");
                num_cpus::get()
            }
            Some(workers) => workers,
            None => num_cpus::get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_no_flags_keeps_config() {
        let parsed = CliArgs::try_parse_from(["program"]).unwrap();
        let mut config = Config::default();
        parsed.apply_overrides(&mut config);

        assert_eq!(config, Config::default());
        assert_eq!(parsed.log_level, "info");
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_all_overrides() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--host",
            "0.0.0.0",
            "--port",
            "5000",
            "--interest-rate",
            "0.1",
            "--interest-interval",
            "0",
            "--delay-ms",
            "3000",
        ])
        .unwrap();
        let mut config = Config::default();
        parsed.apply_overrides(&mut config);

        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
        assert_eq!(config.interest_rate, 0.1);
        assert_eq!(config.auto_interest_interval, 0);
        assert_eq!(config.critical_section_delay_ms, 3000);
    }

    #[test]
    fn test_negative_rate_parses_and_fails_validation() {
        let parsed = CliArgs::try_parse_from(["program", "--interest-rate", "-2"]).unwrap();
        let mut config = Config::default();
        parsed.apply_overrides(&mut config);

        assert!(config.validate().is_err());
    }

    #[rstest]
    #[case::default(&["program"], num_cpus::get())]
    #[case::explicit(&["program", "--workers", "4"], 4)]
    #[case::zero_falls_back(&["program", "--workers", "0"], num_cpus::get())]
    fn test_worker_threads(#[case] args: &[&str], #[case] expected: usize) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.worker_threads(), expected);
    }

    #[rstest]
    #[case::bad_port(&["program", "--port", "70000"])]
    #[case::bad_rate(&["program", "--interest-rate", "lots"])]
    #[case::unknown_flag(&["program", "--listen", "9876"])]
    #[case::positional(&["program", "serve"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
