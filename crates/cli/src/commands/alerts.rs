//! Alert inbox.
//!
//! # Usage
//!
//! ```bash
//! taskboard alerts list
//! taskboard alerts create --user 2 --message "Nueva tarea asignada"
//! taskboard alerts hide 3 4
//! taskboard alerts mark-seen
//! ```

use std::io::Write;

use clap::Subcommand;
use taskboard_client::{AlertService, DashboardController};
use taskboard_core::{AlertId, AlertUpdate, NewAlert, UserId};

use super::{CommandError, Context, render};

#[derive(Subcommand)]
pub enum AlertCommand {
    /// List alerts (`*` marks unseen ones)
    List,
    /// Show one alert
    Get { id: AlertId },
    /// Send an alert to a user
    Create {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        message: String,
    },
    /// Change an alert's message
    Update {
        id: AlertId,
        #[arg(long)]
        message: String,
    },
    /// Delete an alert
    Delete { id: AlertId },
    /// Hide the given alerts
    Hide {
        #[arg(required = true)]
        ids: Vec<AlertId>,
    },
    /// Hide every unseen alert
    MarkSeen,
}

pub async fn run(
    ctx: &Context,
    out: &mut impl Write,
    command: AlertCommand,
) -> Result<(), CommandError> {
    ctx.require_login()?;
    let alerts = AlertService::new(ctx.api());

    match command {
        AlertCommand::List => render::alerts(out, &alerts.list().await?)?,
        AlertCommand::Get { id } => render::alert(out, &alerts.get(id).await?)?,
        AlertCommand::Create { user, message } => {
            let created = alerts.create(&NewAlert { user, message }).await?;
            write!(out, "Sent ")?;
            render::alert(out, &created)?;
        }
        AlertCommand::Update { id, message } => {
            let updated = alerts.update(id, &AlertUpdate { message }).await?;
            write!(out, "Updated ")?;
            render::alert(out, &updated)?;
        }
        AlertCommand::Delete { id } => {
            alerts.delete(id).await?;
            writeln!(out, "Deleted alert {id}.")?;
        }
        AlertCommand::Hide { ids } => {
            alerts.hide(&ids).await?;
            writeln!(out, "Hid {} alert(s).", ids.len())?;
        }
        AlertCommand::MarkSeen => {
            let mut dashboard = DashboardController::activate(ctx.session()).await?;
            let hidden = dashboard.mark_all_seen().await?;
            writeln!(out, "Marked {hidden} alert(s) as seen.")?;
        }
    }
    Ok(())
}
