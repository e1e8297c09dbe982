//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap and
//! the handlers behind each command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::auth::{AuthFileProvider, AzureAuthProvider};
use crate::config::{load_config, Config};
use crate::error::Result;
use crate::netapp::operations::AzureNetAppOperations;
use crate::uri::{self, ResourceCoordinates};
use crate::utils::format::{format_rows, DisplayUtils};
use crate::utils::helpers::GIB;
use crate::workflow::{ExitStatus, Workflow};

#[derive(Parser)]
#[command(name = "anf-sample")]
#[command(about = "Provision and tear down Azure NetApp Files resources")]
#[command(version, author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the provisioning workflow
    Run {
        /// Delete every created resource once the workflow finishes
        #[arg(long)]
        cleanup: bool,
        /// Azure region to create resources in
        #[arg(long)]
        location: Option<String>,
        /// Resource group that holds the NetApp account
        #[arg(long)]
        resource_group: Option<String>,
        /// NetApp account name (generated when not set)
        #[arg(long)]
        account_name: Option<String>,
    },
    /// Classify an Azure resource id and print the names it contains
    Inspect {
        /// Full resource id, e.g. /subscriptions/../netAppAccounts/acct1
        resource_id: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show the configuration file path
    Path,
}

impl Cli {
    pub async fn execute(self) -> Result<ExitStatus> {
        let mut config = load_config(self.config.as_deref()).await?;
        if self.no_color {
            config.no_color = true;
        }

        match self.command {
            Commands::Run {
                cleanup,
                location,
                resource_group,
                account_name,
            } => {
                if cleanup {
                    config.should_cleanup = true;
                }
                if let Some(location) = location {
                    config.location = location;
                }
                if let Some(resource_group) = resource_group {
                    config.resource_group = resource_group;
                }
                if let Some(account_name) = account_name {
                    config.account_name = account_name;
                }
                execute_run(config).await
            }
            Commands::Inspect { resource_id } => execute_inspect(&resource_id, &config),
            Commands::Config { command } => execute_config_command(command, &config),
        }
    }
}

async fn execute_run(config: Config) -> Result<ExitStatus> {
    config.validate()?;
    let display = DisplayUtils::new(config.no_color);

    display.print_header("Azure NetApp Files SDK Sample")?;
    display.print_info(&format!(
        "Creating account {} in {} ({})",
        config.account_name, config.resource_group, config.location
    ))?;

    let provider = AuthFileProvider::from_env()?;
    let subscription_id = provider.subscription_id().to_string();
    let provider: Arc<dyn AzureAuthProvider> = Arc::new(provider);

    let ops = AzureNetAppOperations::new(provider)?
        .with_operation_poll_interval(config.operation_poll_interval());
    let no_color = config.no_color;
    let workflow = Workflow::new(Arc::new(ops), config, subscription_id);

    let state = workflow.run().await;

    println!();
    println!("{}", format_rows(&state.summary_rows(), no_color));

    if let Some(quota) = state.resized_quota {
        display.print_info(&resized_quota_message(quota))?;
    }

    if state.is_success() {
        display.print_success("Workflow completed")?;
    } else {
        display.print_error("Workflow failed, see the summary above")?;
    }

    info!("Workflow finished with exit code {}", state.exit_status.code());
    Ok(state.exit_status)
}

fn resized_quota_message(quota: u64) -> String {
    format!("Resized volume quota: {} GiB", quota / GIB)
}

/// Name/value pairs describing a resource id
pub fn describe_resource_id(resource_id: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = vec![("Name".to_string(), uri::get_resource_name(resource_id)?)];

    let kind = uri::classify(resource_id)
        .map(|k| k.to_string())
        .unwrap_or_else(|| "not an Azure NetApp Files resource".to_string());
    pairs.push(("Kind".to_string(), kind));

    if uri::is_anf_resource(resource_id) {
        let coordinates = ResourceCoordinates::from_resource_id(resource_id)?;
        let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
        pairs.extend([
            ("Subscription".to_string(), coordinates.subscription_id),
            ("Resource group".to_string(), coordinates.resource_group),
            ("Account".to_string(), coordinates.account),
            ("Capacity pool".to_string(), optional(coordinates.capacity_pool)),
            ("Volume".to_string(), optional(coordinates.volume)),
            ("Snapshot".to_string(), optional(coordinates.snapshot)),
        ]);
    } else {
        pairs.push(("Subscription".to_string(), uri::get_subscription(resource_id)?));
        pairs.push(("Resource group".to_string(), uri::get_resource_group(resource_id)?));
    }

    Ok(pairs)
}

fn execute_inspect(resource_id: &str, config: &Config) -> Result<ExitStatus> {
    let display = DisplayUtils::new(config.no_color);
    let pairs = describe_resource_id(resource_id)?;

    if !uri::is_anf_resource(resource_id) {
        display.print_warning(&format!("{} is not a {} resource", resource_id, uri::NETAPP_PROVIDER))?;
    }

    let borrowed: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    println!("{}", display.format_key_value_pairs(&borrowed));
    Ok(ExitStatus::Success)
}

fn execute_config_command(command: ConfigCommands, config: &Config) -> Result<ExitStatus> {
    match command {
        ConfigCommands::Show => execute_config_show(config)?,
        ConfigCommands::Path => {
            println!("{}", Config::get_config_path()?.display());
        }
    }
    Ok(ExitStatus::Success)
}

fn execute_config_show(config: &Config) -> Result<()> {
    let display = DisplayUtils::new(config.no_color);

    let mut tags: Vec<String> = config
        .tags
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    tags.sort();

    let values = [
        ("location", config.location.clone()),
        ("resource_group", config.resource_group.clone()),
        ("vnet_resource_group", config.vnet_resource_group.clone()),
        ("vnet_name", config.vnet_name.clone()),
        ("subnet_name", config.subnet_name.clone()),
        ("account_name", config.account_name.clone()),
        ("pool_name", config.pool_name.clone()),
        ("service_level", config.service_level.clone()),
        ("pool_size_bytes", config.pool_size_bytes.to_string()),
        ("volume_size_bytes", config.volume_size_bytes.to_string()),
        ("should_cleanup", config.should_cleanup.to_string()),
        ("poll_interval_secs", config.poll_interval_secs.to_string()),
        ("poll_max_attempts", config.poll_max_attempts.to_string()),
        ("tags", tags.join(", ")),
    ];
    let pairs: Vec<(&str, &str)> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();

    display.print_header("Configuration")?;
    println!("{}", display.format_key_value_pairs(&pairs));
    Ok(())
}
