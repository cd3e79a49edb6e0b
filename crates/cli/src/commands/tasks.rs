//! Task management.
//!
//! # Usage
//!
//! ```bash
//! taskboard tasks list
//! taskboard tasks list --project 16
//! taskboard tasks create --name T1 --project 16 --assignee 2
//! taskboard tasks status 7 completed
//! ```

use std::io::Write;

use clap::Subcommand;
use taskboard_client::TaskService;
use taskboard_core::{NewTask, ProjectId, TaskId, TaskStatus, TaskUpdate, UserId};

use super::{CommandError, Context, render};

#[derive(Subcommand)]
pub enum TaskCommand {
    /// List tasks, grouped by project unless one project is given
    List {
        #[arg(long)]
        project: Option<ProjectId>,
    },
    /// Show one task
    Get { id: TaskId },
    /// Create a task
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        assignee: UserId,
        /// `pending`, `in_progress` or `completed`
        #[arg(long, default_value = "pending")]
        status: TaskStatus,
    },
    /// Update a task; omitted fields keep their value
    Update {
        id: TaskId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        assignee: Option<UserId>,
    },
    /// Change only a task's status
    Status { id: TaskId, status: TaskStatus },
    /// Delete a task
    Delete { id: TaskId },
}

pub async fn run(
    ctx: &Context,
    out: &mut impl Write,
    command: TaskCommand,
) -> Result<(), CommandError> {
    ctx.require_login()?;
    let tasks = TaskService::new(ctx.api());

    match command {
        TaskCommand::List { project: None } => render::grouped_tasks(out, &tasks.list().await?)?,
        TaskCommand::List {
            project: Some(project),
        } => render::tasks(out, &tasks.list_for_project(project).await?)?,
        TaskCommand::Get { id } => render::task(out, &tasks.get(id).await?)?,
        TaskCommand::Create {
            name,
            description,
            project,
            assignee,
            status,
        } => {
            let created = tasks
                .create(&NewTask {
                    name,
                    description,
                    status,
                    project,
                    assignee,
                })
                .await?;
            write!(out, "Created ")?;
            render::task(out, &created)?;
        }
        TaskCommand::Update {
            id,
            name,
            description,
            status,
            assignee,
        } => {
            let update = TaskUpdate {
                name,
                description,
                status,
                assignee,
            };
            if update.is_empty() {
                return Err(CommandError::InvalidArgument("nothing to update".to_string()));
            }
            let updated = tasks.update(id, &update).await?;
            write!(out, "Updated ")?;
            render::task(out, &updated)?;
        }
        TaskCommand::Status { id, status } => {
            let updated = tasks.set_status(id, status).await?;
            write!(out, "Updated ")?;
            render::task(out, &updated)?;
        }
        TaskCommand::Delete { id } => {
            tasks.delete(id).await?;
            writeln!(out, "Deleted task {id}.")?;
        }
    }
    Ok(())
}
