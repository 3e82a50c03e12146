use crate::app::App;

/// Handle the logout action. Safe to run when already logged out.
pub fn handle(app: &App) {
    app.auth.logout();
    println!("Logged out");
}
