//! Login, registration and logout.
//!
//! # Usage
//!
//! ```bash
//! taskboard login -u ana            # prompts for the password
//! taskboard register -u eva -e eva@example.com -p 's3cret'
//! taskboard whoami
//! taskboard logout
//! ```

use std::io::Write;
use std::path::Path;

use taskboard_client::{FileTokenStore, RegisterOutcome, end_session};
use taskboard_core::Email;

use super::{CommandError, Context, password_or_prompt, render};

pub async fn login(
    ctx: &Context,
    out: &mut impl Write,
    username: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = password_or_prompt(password)?;
    let claims = ctx.session().login(username, &password).await?;
    write!(out, "Logged in as ")?;
    render::identity(out, &claims)?;
    Ok(())
}

pub async fn register(
    ctx: &Context,
    out: &mut impl Write,
    username: &str,
    email: &Email,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = password_or_prompt(password)?;
    match ctx.session().register(username, email, &password).await? {
        RegisterOutcome::SignedIn { claims, .. } => {
            write!(out, "Registered and logged in as ")?;
            render::identity(out, &claims)?;
        }
        RegisterOutcome::Registered(user) => {
            writeln!(out, "Registered {} (id {}); log in to continue.", user.username, user.id)?;
        }
    }
    Ok(())
}

/// End the session stored at `session_file`. Works offline and without
/// an API URL.
pub fn logout(session_file: &Path, out: &mut impl Write) -> Result<(), CommandError> {
    end_session(&FileTokenStore::new(session_file));
    writeln!(out, "Logged out.")?;
    Ok(())
}

pub fn whoami(ctx: &Context, out: &mut impl Write) -> Result<(), CommandError> {
    let claims = ctx.require_login()?;
    render::identity(out, &claims)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use taskboard_client::TokenStore;

    use super::*;

    #[test]
    fn test_logout_removes_session_file() {
        let dir =
            std::env::temp_dir().join(format!("taskboard-cli-logout-{}", std::process::id()));
        let path = dir.join("session.json");
        let store = FileTokenStore::new(&path);
        store.save(&SecretString::from("header.payload.signature")).unwrap();
        assert!(path.exists());

        let mut out = Vec::new();
        logout(&path, &mut out).unwrap();
        assert!(!path.exists());
        assert_eq!(String::from_utf8(out).unwrap(), "Logged out.\n");

        // Logging out twice is fine
        let mut out = Vec::new();
        logout(&path, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Logged out.\n");
        let _ = std::fs::remove_dir_all(dir);
    }
}
