//! Protected user actions: whoami, profile update, password change, stats.
//!
//! Each one goes through the route guard first, so a stale local session is
//! rejected with a redirect hint instead of reaching the backend handler
//! path with a token the server no longer accepts.

use anyhow::{bail, Context, Result};
use secrecy::SecretString;

use crate::app::App;
use crate::guard::GuardOutcome;
use crate::models::UserUpdate;

async fn require_session(app: &App, path: &str) -> Result<()> {
    match app.guard.check(path).await {
        GuardOutcome::Allow => Ok(()),
        GuardOutcome::Deny { redirect } => {
            bail!("not authenticated, run `opoadmin login` first (would redirect to {redirect})")
        }
    }
}

pub async fn whoami(app: &App) -> Result<()> {
    require_session(app, "/whoami").await?;

    let user = app.auth.user_info().await.context("failed to fetch user")?;
    println!("{} <{}>", user.name, user.email);
    if let Some(id) = user.id {
        println!("id:   {id}");
    }
    let area = app.auth.user_area();
    println!("area: {} ({})", area.short_name(), area.name());
    if let Some(last_login) = user.last_login {
        println!("last login: {last_login}");
    }
    Ok(())
}

pub async fn update(app: &App, name: Option<String>, email: Option<String>) -> Result<()> {
    if name.is_none() && email.is_none() {
        bail!("nothing to update, pass --name and/or --email");
    }

    require_session(app, "/user").await?;

    let update = UserUpdate { name, email };
    let user = app
        .auth
        .update_user(&update)
        .await
        .context("failed to update user")?;

    println!("Updated profile: {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn passwd(app: &App, current: SecretString, new: SecretString) -> Result<()> {
    require_session(app, "/user").await?;

    let response = app
        .auth
        .change_password(&current, &new)
        .await
        .context("failed to change password")?;

    println!("{}", response.message);
    Ok(())
}

pub async fn stats(app: &App) -> Result<()> {
    require_session(app, "/stats").await?;

    let stats = app.auth.user_stats().await.context("failed to fetch stats")?;
    println!("{} <{}>", stats.user.name, stats.user.email);
    println!("member since: {}", stats.user.created_at);
    println!("last login:   {}", stats.user.last_login);
    println!(
        "topics: {} total, {} enabled, {} disabled",
        stats.system_info.total_topics,
        stats.system_info.enabled_topics,
        stats.system_info.disabled_topics
    );
    Ok(())
}
