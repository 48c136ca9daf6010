use clap::{Args, ValueEnum};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log level
    #[arg(long, env = "NODE_LOG_LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,

    /// Log format
    #[arg(long, env = "NODE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// command output. A second call is a no-op.
pub fn init_logging(args: &LogArgs) {
    match args.log_format {
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .json()
                .with_max_level(args.log_level)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Text => {
            let _ = tracing_subscriber::fmt()
                .with_max_level(args.log_level)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        log: LogArgs,
    }

    #[test]
    fn parses_level_and_format() {
        let cli =
            TestCli::try_parse_from(["test", "--log-level", "debug", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log.log_level, Level::DEBUG);
        assert_eq!(cli.log.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(TestCli::try_parse_from(["test", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn init_twice_is_harmless() {
        let args = LogArgs { log_level: Level::WARN, log_format: LogFormat::Text };
        init_logging(&args);
        init_logging(&args);
    }
}
