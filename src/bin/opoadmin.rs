use anyhow::Result;
use opoadmin::app::App;
use opoadmin::cli::{actions, actions::Action, start::start};

#[tokio::main]
async fn main() -> Result<()> {
    let (globals, action) = start()?;

    let app = App::bootstrap(&globals.app_config())?;

    match action {
        Action::Login { email, password } => actions::login::handle(&app, &email, password).await?,
        Action::Logout => actions::logout::handle(&app),
        Action::Whoami => actions::user::whoami(&app).await?,
        Action::Update { name, email } => actions::user::update(&app, name, email).await?,
        Action::Passwd { current, new } => actions::user::passwd(&app, current, new).await?,
        Action::Stats => actions::user::stats(&app).await?,
        Action::Area(area_action) => actions::area::handle(&app, area_action)?,
    }

    Ok(())
}
