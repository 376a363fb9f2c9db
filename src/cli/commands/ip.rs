use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::repository::ip_address;
use crate::iprange::{u32_to_ipv4, IpRangeSet};

/// Largest pool one command may provision (a /16)
pub const MAX_PROVISION: usize = 65_536;

#[derive(Subcommand)]
pub enum IpCommands {
    #[command(about = "Add addresses to the pool as Available")]
    Add {
        #[arg(help = "Ranges, e.g. '10.0.0.1-10.0.0.50, 10.0.1'")]
        ranges: String,
        #[arg(long, help = "Only print what would be added")]
        dry_run: bool,
    },

    #[command(about = "Check whether an address falls inside a range list")]
    Check {
        #[arg(help = "Dotted-quad address")]
        ip: String,
        #[arg(long, help = "Range list as stored on a department")]
        ranges: String,
    },
}

/// Every address a range list covers, in order
pub fn expand_pool(ranges: &str) -> anyhow::Result<Vec<String>> {
    let set = IpRangeSet::parse(ranges).with_context(|| format!("invalid range list '{}'", ranges))?;
    if set.is_empty() {
        bail!("range list is empty");
    }

    if set.span_len() > MAX_PROVISION as u64 {
        bail!(
            "'{}' covers {} addresses, more than the {} allowed at once",
            ranges,
            set.span_len(),
            MAX_PROVISION
        );
    }
    Ok(set.expand().into_iter().map(u32_to_ipv4).collect())
}

pub async fn handle(cmd: IpCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        IpCommands::Add { ranges, dry_run } => {
            let addresses = expand_pool(&ranges)?;

            if dry_run {
                let message = format!("{} addresses would be provisioned", addresses.len());
                return output_success(&output_format, &message, Some(json!({ "addresses": addresses })));
            }

            let pool = super::connect().await?;
            let mut tx = pool.begin().await?;
            let inserted = ip_address::insert_many(&mut tx, &addresses).await?;
            tx.commit().await?;

            let message = format!(
                "Added {} addresses ({} already present)",
                inserted,
                addresses.len() as u64 - inserted
            );
            output_success(
                &output_format,
                &message,
                Some(json!({ "requested": addresses.len(), "inserted": inserted })),
            )
        }
        IpCommands::Check { ip, ranges } => {
            let set = IpRangeSet::parse(&ranges).with_context(|| format!("invalid range list '{}'", ranges))?;
            let allowed = set.is_empty() || set.contains(&ip);

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "ip": ip,
                            "ranges": set.to_string(),
                            "allowed": allowed,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    let verdict = if allowed { "inside" } else { "outside" };
                    println!("{} is {} {}", ip, verdict, set);
                }
            }
            Ok(())
        }
    }
}
