//! User management.
//!
//! # Usage
//!
//! ```bash
//! taskboard users list
//! taskboard users me
//! taskboard users create -u eva -e eva@example.com -p 's3cret' -r usuario
//! taskboard users update 4 --name "Eva Ruiz"
//! taskboard users delete 4
//! ```

use std::io::Write;

use clap::Subcommand;
use taskboard_client::UserService;
use taskboard_core::{Email, NewUser, Role, UserId, UserUpdate};

use super::{CommandError, Context, render};

#[derive(Subcommand)]
pub enum UserCommand {
    /// List users
    List,
    /// Show one user
    Get { id: UserId },
    /// Show your own record as the server sees it
    Me,
    /// Create a user
    Create {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: Email,
        #[arg(short, long)]
        password: String,
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
        /// Role (`admin`, `usuario`)
        #[arg(short, long)]
        role: Option<String>,
    },
    /// Update a user; omitted fields keep their value
    Update {
        id: UserId,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<Email>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a user
    Delete { id: UserId },
}

pub async fn run(
    ctx: &Context,
    out: &mut impl Write,
    command: UserCommand,
) -> Result<(), CommandError> {
    ctx.require_login()?;
    let users = UserService::new(ctx.api());

    match command {
        UserCommand::List => render::users(out, &users.list().await?)?,
        UserCommand::Get { id } => render::user(out, &users.get(id).await?)?,
        UserCommand::Me => render::user(out, &users.me().await?)?,
        UserCommand::Create {
            username,
            email,
            password,
            name,
            role,
        } => {
            let created = users
                .create(&NewUser {
                    username,
                    email,
                    password,
                    name,
                    role: role.as_deref().map(Role::from),
                })
                .await?;
            write!(out, "Created ")?;
            render::user(out, &created)?;
        }
        UserCommand::Update {
            id,
            username,
            email,
            name,
            role,
            password,
        } => {
            let current = users.get(id).await?;
            let mut update = UserUpdate::from_user(&current);
            if let Some(username) = username {
                update.username = username;
            }
            if email.is_some() {
                update.email = email;
            }
            if name.is_some() {
                update.name = name;
            }
            if let Some(role) = role {
                update.role = Some(Role::from(role));
            }
            update.password = password;

            let updated = users.update(id, &update).await?;
            write!(out, "Updated ")?;
            render::user(out, &updated)?;
        }
        UserCommand::Delete { id } => {
            users.delete(id).await?;
            writeln!(out, "Deleted user {id}.")?;
        }
    }
    Ok(())
}
