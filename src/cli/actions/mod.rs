pub mod area;
pub mod login;
pub mod logout;
pub mod user;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login {
        email: String,
        password: Option<SecretString>,
    },
    Logout,
    Whoami,
    Update {
        name: Option<String>,
        email: Option<String>,
    },
    Passwd {
        current: SecretString,
        new: SecretString,
    },
    Stats,
    Area(AreaAction),
}

#[derive(Debug)]
pub enum AreaAction {
    Show,
    Set { id: String },
    History,
}
