//! Project management.
//!
//! # Usage
//!
//! ```bash
//! taskboard projects list
//! taskboard projects create --name Migración --start 2024-10-01 --end 2024-12-20 --owner 2
//! taskboard projects update 16 --end 2025-01-31
//! ```

use std::io::Write;

use chrono::NaiveDate;
use clap::Subcommand;
use taskboard_client::ProjectService;
use taskboard_core::{ProjectId, ProjectInput, UserId};

use super::{CommandError, Context, render};

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// List projects
    List,
    /// Show one project
    Get { id: ProjectId },
    /// Create a project
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Owning user ID
        #[arg(long)]
        owner: UserId,
    },
    /// Update a project; omitted fields keep their value
    Update {
        id: ProjectId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        owner: Option<UserId>,
    },
    /// Delete a project
    Delete { id: ProjectId },
}

fn check_dates(input: &ProjectInput) -> Result<(), CommandError> {
    if input.end_date < input.start_date {
        return Err(CommandError::InvalidArgument(format!(
            "end date {} is before start date {}",
            input.end_date, input.start_date
        )));
    }
    Ok(())
}

pub async fn run(
    ctx: &Context,
    out: &mut impl Write,
    command: ProjectCommand,
) -> Result<(), CommandError> {
    ctx.require_login()?;
    let projects = ProjectService::new(ctx.api());

    match command {
        ProjectCommand::List => render::projects(out, &projects.list().await?)?,
        ProjectCommand::Get { id } => render::project(out, &projects.get(id).await?)?,
        ProjectCommand::Create {
            name,
            description,
            start,
            end,
            owner,
        } => {
            let input = ProjectInput {
                name,
                description,
                start_date: start,
                end_date: end,
                owner,
            };
            check_dates(&input)?;
            let created = projects.create(&input).await?;
            write!(out, "Created ")?;
            render::project(out, &created)?;
        }
        ProjectCommand::Update {
            id,
            name,
            description,
            start,
            end,
            owner,
        } => {
            let mut input = ProjectInput::from(&projects.get(id).await?);
            input.name = name.unwrap_or(input.name);
            input.description = description.unwrap_or(input.description);
            input.start_date = start.unwrap_or(input.start_date);
            input.end_date = end.unwrap_or(input.end_date);
            input.owner = owner.unwrap_or(input.owner);
            check_dates(&input)?;

            let updated = projects.update(id, &input).await?;
            write!(out, "Updated ")?;
            render::project(out, &updated)?;
        }
        ProjectCommand::Delete { id } => {
            projects.delete(id).await?;
            writeln!(out, "Deleted project {id}.")?;
        }
    }
    Ok(())
}
