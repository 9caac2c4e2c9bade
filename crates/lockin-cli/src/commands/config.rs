use clap::Subcommand;
use lockin_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "focus.default_minutes", "remote.base_url")
        key: String,
    },
    /// Set a config value and save it
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Print the whole config as JSON
    Show,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
