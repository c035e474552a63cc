// CLI module for operator commands that need direct server access

pub mod approvals;
pub mod migrate;
pub mod seed_demo;

use std::future::Future;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;
use crate::types::internal::context::RequestContext;

/// Acadify backend: HTTP server and operator commands
#[derive(Parser, Debug)]
#[command(name = "acadify")]
#[command(about = "Acadify college backend", long_about = None)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the HTTP API server
    Serve,

    /// Apply pending migrations to the main and audit databases
    Migrate,

    /// Review registration approvals as an operator
    #[command(subcommand)]
    Approvals(ApprovalCommands),

    /// Create a demo institution with one approved account per role
    SeedDemo {
        #[arg(long)]
        institution_code: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ApprovalCommands {
    /// List pending requests for an institution
    List {
        #[arg(long)]
        institution_code: String,

        /// Comma-separated requested roles, e.g. `student,staff`
        #[arg(long)]
        role: Option<String>,
    },

    /// Approve a pending request
    Approve {
        request_id: String,

        #[arg(long)]
        user_id: String,
    },

    /// Reject a pending request
    Reject {
        request_id: String,

        #[arg(long)]
        user_id: String,

        #[arg(long)]
        remarks: String,
    },
}

/// Execute an operator command
///
/// `serve` and `migrate` are handled by `main` before `AppData` exists.
pub async fn execute_command(
    command: Commands,
    app_data: Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve | Commands::Migrate => {
            return Err("serve and migrate are not operator commands".into());
        }
        Commands::Approvals(ApprovalCommands::List {
            institution_code,
            role,
        }) => {
            let args = vec![institution_code.clone(), role.clone().unwrap_or_default()];
            audited(&app_data, "approvals_list", args, |ctx| {
                approvals::list_pending(&app_data, ctx, &institution_code, role.as_deref())
            })
            .await?;
        }
        Commands::Approvals(ApprovalCommands::Approve {
            request_id,
            user_id,
        }) => {
            let args = vec![request_id.clone(), user_id.clone()];
            audited(&app_data, "approvals_approve", args, |ctx| {
                approvals::approve(&app_data, ctx, &request_id, &user_id)
            })
            .await?;
        }
        Commands::Approvals(ApprovalCommands::Reject {
            request_id,
            user_id,
            remarks,
        }) => {
            let args = vec![request_id.clone(), user_id.clone()];
            audited(&app_data, "approvals_reject", args, |ctx| {
                approvals::reject(&app_data, ctx, &request_id, &user_id, &remarks)
            })
            .await?;
        }
        Commands::SeedDemo { institution_code } => {
            let args = vec![institution_code.clone()];
            audited(&app_data, "seed_demo", args, |ctx| {
                seed_demo::seed_demo(&app_data, ctx, &institution_code)
            })
            .await?;
        }
    }

    Ok(())
}

/// Wrap a command in CLI session start/end audit events
async fn audited<F, Fut>(
    app_data: &AppData,
    command_name: &str,
    args: Vec<String>,
    command: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(RequestContext) -> Fut,
    Fut: Future<Output = Result<(), Box<dyn std::error::Error>>>,
{
    let ctx = RequestContext::for_cli(command_name);

    if let Err(e) = app_data
        .audit_logger
        .log_cli_session_start(&ctx, command_name, args)
        .await
    {
        tracing::error!("Failed to log CLI session start: {:?}", e);
    }

    let result = command(ctx.clone()).await;

    let error_message = result.as_ref().err().map(|e| e.to_string());
    if let Err(e) = app_data
        .audit_logger
        .log_cli_session_end(&ctx, command_name, result.is_ok(), error_message)
        .await
    {
        tracing::error!("Failed to log CLI session end: {:?}", e);
    }

    result
}
