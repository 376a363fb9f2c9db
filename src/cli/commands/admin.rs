use anyhow::bail;
use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::repository::account;
use crate::database::DatabaseError;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create an administrator account")]
    Create {
        #[arg(help = "Login name")]
        username: String,
        #[arg(long, help = "Initial password")]
        password: String,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create { username, password } => {
            let username = username.trim().to_string();
            if username.is_empty() || password.trim().is_empty() {
                bail!("username and password must not be empty");
            }

            let pool = super::connect().await?;
            let hash = hash_password(password).await?;
            let admin = match account::create_admin(&pool, &username, &hash).await {
                Ok(admin) => admin,
                Err(DatabaseError::Conflict(_)) => bail!("admin '{}' already exists", username),
                Err(e) => return Err(e.into()),
            };

            output_success(
                &output_format,
                &format!("Created admin '{}'", admin.username),
                Some(json!({ "id": admin.id, "username": admin.username })),
            )
        }
    }
}
