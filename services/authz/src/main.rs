//! Operator CLI for the authorization store.
//!
//! # Usage
//!
//! ```bash
//! # Install the permission catalogue, a "Super Admin" role and one admin account
//! warden seed --admin-email root@example.com --admin-password change-me
//!
//! # Print a user's effective permissions as JSON
//! warden permissions --user 0190f7a2-6c1e-7d3a-9a52-3f1f0d2c4b11
//!
//! # Decide whether a bearer credential holds a permission
//! warden check --token "$TOKEN" --permission role.update
//! ```

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use sea_orm::Database;
use tracing::info;
use uuid::Uuid;
use warden_core::context::RequestContext;
use warden_core::tracing::init_tracing;

use warden_authz::config::AuthzConfig;
use warden_authz::error::AuthzError;
use warden_authz::state::AppState;
use warden_authz::usecase::access::RequirePermissionUseCase;
use warden_authz::usecase::resolve::ResolvePermissionsUseCase;
use warden_authz::usecase::seed::SeedUseCase;
use warden_authz::usecase::user::CreateUserInput;

#[derive(Parser)]
#[command(name = "warden", about = "Manage and query the RBAC store")]
struct Args {
    /// Abandon the command after this many seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install the permission catalogue, a Super Admin role and an admin account
    Seed {
        #[arg(long, default_value = "Administrator")]
        admin_name: String,
        #[arg(long)]
        admin_email: String,
        #[arg(long)]
        admin_password: String,
    },
    /// Print the effective permissions of a user
    Permissions {
        #[arg(long)]
        user: Uuid,
    },
    /// Check whether a bearer credential holds a named permission
    Check {
        #[arg(long)]
        token: String,
        #[arg(long)]
        permission: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = AuthzConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    let redis = deadpool_redis::Config::from_url(&config.redis_url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .context("failed to create Redis pool")?;
    let state = AppState::new(&config, db, redis);

    let ctx = RequestContext::background().with_timeout(Duration::from_secs(args.timeout_secs));
    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    match args.command {
        Command::Seed {
            admin_name,
            admin_email,
            admin_password,
        } => seed(&state, &ctx, admin_name, admin_email, admin_password).await,
        Command::Permissions { user } => {
            let permissions = ResolvePermissionsUseCase {
                user_roles: state.user_role_repo(),
                roles: state.role_repo(),
            }
            .execute(&ctx, user.into())
            .await?;
            println!("{}", serde_json::to_string_pretty(&permissions)?);
            Ok(())
        }
        Command::Check { token, permission } => {
            let ctx = state.gate.enter(&ctx, &token)?;
            let usecase = RequirePermissionUseCase {
                user_roles: state.user_role_repo(),
                permissions: state.permission_repo(),
                role_permissions: state.role_permission_repo(),
            };
            match usecase.execute(&ctx, &permission).await {
                Ok(_) => {
                    println!("granted");
                    Ok(())
                }
                Err(AuthzError::Forbidden) => {
                    println!("denied");
                    std::process::exit(1);
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

async fn seed(
    state: &AppState,
    ctx: &RequestContext,
    admin_name: String,
    admin_email: String,
    admin_password: String,
) -> Result<()> {
    let outcome = SeedUseCase {
        users: state.user_repo(),
        roles: state.role_repo(),
        permissions: state.permission_repo(),
        user_roles: state.user_role_repo(),
    }
    .execute(
        ctx,
        CreateUserInput {
            name: admin_name,
            email: admin_email,
            password: admin_password,
            phone_number: String::new(),
            photo: String::new(),
            dob: None,
        },
    )
    .await?;

    info!(
        role_id = %outcome.role.id,
        role_created = outcome.role_created,
        admin_id = ?outcome.admin.map(|u| u.id),
        "seed complete"
    );
    Ok(())
}
