use clap::Subcommand;
use lockin_core::{Config, QueryClient, SessionStore};
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Print the logged-in user
    Show,
    /// Forget the logged-in user
    Clear,
    /// Log in against the remote backend and remember the user
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

pub async fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::open()?;
    match action {
        SessionAction::Show => {
            print_json(&json!({
                "user_id": store.current_user_id()?,
                "user": store.current_user()?,
            }))?;
        }
        SessionAction::Clear => {
            store.logout()?;
            println!("ok");
        }
        SessionAction::Login { email, password } => {
            let config = Config::load()?;
            let client = QueryClient::from_config(&config.remote)?;
            let user = client
                .login(&email, &password)
                .await?
                .ok_or("invalid email or password")?;
            let user = store.save_login(&user)?;
            print_json(&user)?;
        }
    }
    Ok(())
}
