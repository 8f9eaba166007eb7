//! Branchlink CLI - look up Jira issues and the branches linked to them

mod commands;

use std::time::Duration;

use branchlink_core::{Config, Secrets};
use branchlink_jira::JiraClient;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{BranchesArgs, IssuesArgs, RepoTypeArgs};

/// Branchlink: Jira issue search and dev-status branch lookup
#[derive(Parser, Debug)]
#[command(name = "branchlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Jira base URL (overrides config and BRANCHLINK_JIRA_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Jira username (overrides config and BRANCHLINK_JIRA_USERNAME)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Request timeout, e.g. `10s`, `0s` for none (overrides config and BRANCHLINK_JIRA_TIMEOUT)
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Search issues by custom field value
    #[command(visible_alias = "search")]
    Issues(IssuesArgs),

    /// Show the repository type linked to an issue
    RepoType(RepoTypeArgs),

    /// List branches linked to an issue
    #[command(visible_alias = "br")]
    Branches(BranchesArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template for the Jira password
    InitSecrets,
}

fn connect(config: &Config) -> anyhow::Result<JiraClient> {
    let secrets = Secrets::load()?;
    Ok(JiraClient::from_config(&config.jira, &secrets)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.url.clone(), cli.username.clone(), cli.timeout)?;

    if cli.verbose {
        tracing::info!(
            base_url = ?config.jira.base_url,
            username = ?config.jira.username,
            timeout = ?config.jira.timeout,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("branchlink {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Issues(args)) => {
            let client = connect(&config)?;
            args.execute(&client, cli.json, cli.verbose).await?;
        }
        Some(Commands::RepoType(args)) => {
            let client = connect(&config)?;
            args.execute(&client, cli.json).await?;
        }
        Some(Commands::Branches(args)) => {
            let client = connect(&config)?;
            args.execute(&client, cli.json, cli.verbose).await?;
        }
        Some(Commands::Config) => {
            println!("Branchlink Configuration");
            println!("========================");
            println!();
            println!("Jira Settings:");
            println!(
                "  base_url: {}",
                config.jira.base_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  username: {}",
                config.jira.username.as_deref().unwrap_or("(not set)")
            );
            println!("  timeout: {}", humantime::format_duration(config.jira.timeout));
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
            if let Some(path) = Secrets::default_secrets_path() {
                println!("Secrets file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - run `branchlink init-secrets`)");
                }
            }
        }
        Some(Commands::InitSecrets) => {
            let path = Secrets::create_template()?;
            println!("Created {}", path.display());
            println!("Edit it and set jira.password.");
        }
        None => {
            println!("Branchlink - Jira issue and branch lookup");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_branches_with_type() {
        let cli = Cli::try_parse_from([
            "branchlink",
            "--timeout",
            "5s",
            "branches",
            "112233",
            "--type",
            "githube",
        ])
        .unwrap();

        assert_eq!(cli.timeout, Some(Duration::from_secs(5)));
        match cli.command {
            Some(Commands::Branches(args)) => {
                assert_eq!(args.issue_id, "112233");
                assert_eq!(args.repository_type.as_deref(), Some("githube"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_alias() {
        let cli = Cli::try_parse_from(["branchlink", "search", "10000", "PRO-3425", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Issues(args)) => {
                assert_eq!(args.field, "10000");
                assert_eq!(args.value, "PRO-3425");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_env_only_read_through_config() {
        // BRANCHLINK_JIRA_* are applied by Config::with_env_overrides, below CLI flags
        let cmd = Cli::command();
        assert!(cmd.get_arguments().all(|arg| arg.get_env().is_none()));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        assert!(Cli::try_parse_from(["branchlink", "--timeout", "soon", "version"]).is_err());
    }
}
