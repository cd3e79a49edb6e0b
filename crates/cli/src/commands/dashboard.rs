//! Dashboard: who is logged in, the alert inbox and the active view.
//!
//! # Usage
//!
//! ```bash
//! taskboard dashboard                 # role-dependent initial view
//! taskboard dashboard --view projects
//! taskboard dashboard --mark-seen     # hide all visible alerts afterwards
//! ```

use std::io::Write;

use taskboard_client::{ActiveView, AuthGuard, DashboardController, Navigation, ViewData};

use super::{CommandError, Context, render};

pub async fn show(
    ctx: &Context,
    out: &mut impl Write,
    view: Option<ActiveView>,
    mark_seen: bool,
) -> Result<(), CommandError> {
    if let Navigation::Redirect(route) = AuthGuard::new(ctx.session()).navigate("/dashboard") {
        return Err(CommandError::NotLoggedIn(route.path()));
    }

    let mut dashboard = DashboardController::activate(ctx.session()).await?;
    if let Some(view) = view {
        dashboard.navigate(view)?;
    }

    let user = dashboard.user();
    writeln!(out, "Signed in as {} ({})", user.display_name(), user.username)?;

    let entries: Vec<String> = dashboard
        .nav_entries()
        .iter()
        .map(|e| {
            if e.view == dashboard.active_view() {
                format!("[{}]", e.label)
            } else {
                e.label.to_string()
            }
        })
        .collect();
    writeln!(out, "{}", entries.join("  "))?;
    writeln!(out)?;

    writeln!(out, "Alerts:")?;
    render::alerts(out, dashboard.visible_alerts())?;
    writeln!(out)?;

    match dashboard.load_active_view().await? {
        ViewData::Users(users) => render::users(out, &users)?,
        ViewData::Projects(projects) => render::projects(out, &projects)?,
        ViewData::Tasks(groups) => render::grouped_tasks(out, &groups)?,
    }

    if mark_seen {
        let hidden = dashboard.mark_all_seen().await?;
        writeln!(out)?;
        writeln!(out, "Marked {hidden} alert(s) as seen.")?;
    }

    Ok(())
}
