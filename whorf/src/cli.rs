use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// whorf - Kubernetes admission controller backed by Checkov
#[derive(Parser, Debug)]
#[command(name = "whorf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the admission webhook and the periodic re-scan
    Serve {
        /// Listen address (default: WHORF_LISTEN_ADDR or 0.0.0.0:8443)
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Scan one manifest and print the admission message lines.
    /// Exits with status 1 when the manifest would be rejected.
    Scan {
        /// Kubernetes manifest (YAML or JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve { listen: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["whorf"]).unwrap();
        assert_eq!(cli.command.unwrap_or_default(), Commands::Serve { listen: None });
    }

    #[test]
    fn test_serve_listen_override() {
        let cli = Cli::try_parse_from(["whorf", "serve", "--listen", "127.0.0.1:9000"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                listen: Some("127.0.0.1:9000".into())
            })
        );
    }

    #[test]
    fn test_scan_requires_file() {
        assert!(Cli::try_parse_from(["whorf", "scan"]).is_err());
        let cli = Cli::try_parse_from(["whorf", "scan", "deploy.yaml"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Scan {
                file: PathBuf::from("deploy.yaml")
            })
        );
    }
}
