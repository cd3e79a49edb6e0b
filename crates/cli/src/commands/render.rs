//! Plain-text rendering of records.

use std::io::{self, Write};

use taskboard_core::{Alert, Project, ProjectTasks, Task, TokenClaims, User};

pub fn identity(out: &mut impl Write, claims: &TokenClaims) -> io::Result<()> {
    let role = claims.role.as_ref().map_or("-", |r| r.as_str());
    writeln!(out, "{} (id {}, role {role})", claims.username, claims.id)?;
    if let Some(email) = &claims.email {
        writeln!(out, "  email: {email}")?;
    }
    if let Some(expires) = claims.expires_at() {
        writeln!(out, "  token expires: {}", expires.format("%Y-%m-%d %H:%M UTC"))?;
    }
    Ok(())
}

pub fn user(out: &mut impl Write, user: &User) -> io::Result<()> {
    let email = user.email.as_ref().map_or("-", |e| e.as_str());
    let role = user.role.as_ref().map_or("-", |r| r.as_str());
    writeln!(
        out,
        "{:>5}  {:<20} {:<28} {:<10} {}",
        user.id,
        user.username,
        email,
        role,
        user.display_name()
    )
}

pub fn users(out: &mut impl Write, users: &[User]) -> io::Result<()> {
    if users.is_empty() {
        return writeln!(out, "No users.");
    }
    writeln!(out, "{:>5}  {:<20} {:<28} {:<10} NAME", "ID", "USERNAME", "EMAIL", "ROLE")?;
    for u in users {
        user(out, u)?;
    }
    Ok(())
}

pub fn project(out: &mut impl Write, p: &Project) -> io::Result<()> {
    writeln!(
        out,
        "{:>5}  {:<30} {} .. {}  owner {}",
        p.id, p.name, p.start_date, p.end_date, p.owner
    )?;
    if !p.description.is_empty() {
        writeln!(out, "       {}", p.description)?;
    }
    Ok(())
}

pub fn projects(out: &mut impl Write, projects: &[Project]) -> io::Result<()> {
    if projects.is_empty() {
        return writeln!(out, "No projects.");
    }
    for p in projects {
        project(out, p)?;
    }
    Ok(())
}

pub fn task(out: &mut impl Write, t: &Task) -> io::Result<()> {
    writeln!(
        out,
        "{:>5}  [{:<11}] {:<30} project {}  assignee {}",
        t.id, t.status, t.name, t.project, t.assignee
    )
}

pub fn tasks(out: &mut impl Write, tasks: &[Task]) -> io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "No tasks.");
    }
    for t in tasks {
        task(out, t)?;
    }
    Ok(())
}

pub fn grouped_tasks(out: &mut impl Write, groups: &[ProjectTasks]) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(out, "No tasks.");
    }
    for group in groups {
        writeln!(out, "{} (project {})", group.name, group.id)?;
        for t in &group.tasks {
            writeln!(
                out,
                "  {:>5}  [{:<11}] {:<30} assignee {}",
                t.id, t.status, t.name, t.assignee
            )?;
        }
    }
    Ok(())
}

pub fn alert(out: &mut impl Write, a: &Alert) -> io::Result<()> {
    let marker = if a.visible { '*' } else { ' ' };
    writeln!(
        out,
        "{marker}{:>4}  {}  to {}  {}",
        a.id,
        a.created_at.format("%Y-%m-%d %H:%M"),
        a.user,
        a.message
    )
}

pub fn alerts<'a>(
    out: &mut impl Write,
    alerts: impl IntoIterator<Item = &'a Alert>,
) -> io::Result<()> {
    let mut any = false;
    for a in alerts {
        alert(out, a)?;
        any = true;
    }
    if !any {
        writeln!(out, "No alerts.")?;
    }
    Ok(())
}
