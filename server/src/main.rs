mod config;
mod http;

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use platform_authz::{
    Action, ApprovalCeiling, Resource, Role, RouteTable, approval_ceiling, has_permission,
};
use platform_obs::{ObsConfig, init_tracing};

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "mfi-authd", version, about = "MFI suite authorization service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP policy decision service.
    Serve(ServeCommand),
    /// Print the permission matrix, route table, and approval ceilings.
    #[command(name = "policy:print")]
    PolicyPrint,
    /// Evaluate a single role/resource/action triple; exits non-zero on deny.
    #[command(name = "policy:check")]
    PolicyCheck {
        role: String,
        resource: String,
        action: String,
    },
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::PolicyPrint => print_policy(),
        Command::PolicyCheck {
            role,
            resource,
            action,
        } => check_policy(&role, &resource, &action),
    }
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let sessions = Arc::new(config.session_store()?);
    let state = AppState {
        config,
        sessions,
        routes: RouteTable::default(),
    };
    http::serve(cmd.into(), state).await
}

fn print_policy() -> Result<()> {
    println!("permission matrix (granted pairs per role)");
    for role in Role::ALL {
        println!("  {role}:");
        for resource in Resource::ALL {
            let granted: Vec<&str> = Action::ALL
                .into_iter()
                .filter(|action| has_permission(role, resource, *action))
                .map(Action::as_str)
                .collect();
            if !granted.is_empty() {
                println!("    {resource}: {}", granted.join(", "));
            }
        }
    }

    println!("route table (longest prefix wins)");
    for rule in RouteTable::default().rules() {
        let roles: Vec<&str> = rule.roles.iter().map(|role| role.as_str()).collect();
        println!("  {} -> {}", rule.prefix, roles.join(", "));
    }

    println!("loan approval ceilings");
    for role in Role::ALL {
        let ceiling = match approval_ceiling(role) {
            ApprovalCeiling::Unlimited => "unlimited".to_string(),
            ApprovalCeiling::UpTo(ceiling) => format!("up to {ceiling}"),
            ApprovalCeiling::Denied => "cannot approve".to_string(),
        };
        println!("  {role}: {ceiling}");
    }
    Ok(())
}

fn check_policy(role: &str, resource: &str, action: &str) -> Result<()> {
    let Some(resource) = Resource::from_str(resource) else {
        bail!("unknown resource {resource}");
    };
    let Some(action) = Action::from_str(action) else {
        bail!("unknown action {action}");
    };
    // Unknown roles are not an error: the policy treats them as
    // unauthenticated, which holds no permissions.
    let allowed = Role::from_str(role)
        .is_some_and(|role| has_permission(role, resource, action));
    println!("{}", if allowed { "allow" } else { "deny" });
    if !allowed {
        std::process::exit(1);
    }
    Ok(())
}
