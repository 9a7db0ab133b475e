use clap::Parser;
use tracing::Level;

const HOST: &str = "127.0.0.1";
const PORT: u16 = 6379;
const MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// Server settings, read from the command line with environment variable fallbacks.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "zstore", about = "A sorted-set server speaking the Redis protocol")]
pub struct Config {
    /// The address to bind to
    #[arg(long, env = "ZSTORE_HOST", default_value = HOST)]
    pub host: String,

    /// The port to listen on
    #[arg(short, long, env = "ZSTORE_PORT", default_value_t = PORT)]
    pub port: u16,

    /// Largest amount of buffered, unparsed bytes accepted from a single client
    #[arg(long, env = "MAX_FRAME_SIZE", default_value_t = MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// Maximum log level: trace, debug, info, warn or error
    #[arg(long, env = "ZSTORE_LOG", default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: HOST.to_string(),
            port: PORT,
            max_frame_size: MAX_FRAME_SIZE,
            log_level: Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["zstore"]).unwrap();

        assert_eq!(config.port, PORT);
        assert_eq!(config.max_frame_size, MAX_FRAME_SIZE);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn from_arguments() {
        let config = Config::try_parse_from([
            "zstore",
            "--host",
            "0.0.0.0",
            "-p",
            "7000",
            "--max-frame-size",
            "1024",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(
            config,
            Config {
                host: "0.0.0.0".to_string(),
                port: 7000,
                max_frame_size: 1024,
                log_level: Level::DEBUG,
            }
        );
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(Config::try_parse_from(["zstore", "--log-level", "loud"]).is_err());
    }
}
