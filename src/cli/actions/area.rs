use anyhow::{bail, Result};

use crate::app::App;
use crate::area::AreaCode;
use crate::cli::actions::AreaAction;

/// Handle the area actions. Selection is purely local state, so no session
/// is required.
pub fn handle(app: &App, action: AreaAction) -> Result<()> {
    match action {
        AreaAction::Show => show(app),
        AreaAction::Set { id } => set(app, &id),
        AreaAction::History => history(app),
    }
}

fn show(app: &App) -> Result<()> {
    match app.areas.current() {
        Some(area) => println!("{} (id {})", area.name, area.id),
        None => println!("no area selected"),
    }
    Ok(())
}

fn set(app: &App, id: &str) -> Result<()> {
    let Some(code) = AreaCode::from_id(id) else {
        let known = AreaCode::ALL
            .iter()
            .map(|code| format!("{} = {}", code.id(), code.short_name()))
            .collect::<Vec<_>>()
            .join(", ");
        bail!("unknown area id {id}, expected one of: {known}");
    };

    app.areas.set_current(code.area())?;
    println!("Selected {}", code.name());
    Ok(())
}

fn history(app: &App) -> Result<()> {
    let history = app.areas.history();
    if history.is_empty() {
        println!("no area selections yet");
        return Ok(());
    }
    for selection in history {
        println!("{}  {}", selection.selected_at.to_rfc3339(), selection.area.name);
    }
    Ok(())
}
