use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use secrecy::SecretString;

use crate::app::App;

/// Handle the login action. When no password was provided it is read from
/// stdin, so it never ends up in the shell history.
pub async fn handle(app: &App, email: &str, password: Option<SecretString>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    let response = app
        .auth
        .login(email, &password)
        .await
        .context("login failed")?;

    println!("Logged in as {} <{}>", response.user.name, response.user.email);
    Ok(())
}

fn read_password() -> Result<SecretString> {
    print!("Password: ");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut password = String::new();
    io::stdin()
        .lock()
        .read_line(&mut password)
        .context("failed to read password from stdin")?;

    Ok(SecretString::from(password.trim_end().to_string()))
}
