use clap::{Args, ValueEnum};
use lockin_core::{Config, QueryClient, RecordKind};
use serde_json::Value;

#[derive(Clone, Copy, ValueEnum)]
pub enum Kind {
    Post,
    Habit,
    Community,
    User,
}

impl From<Kind> for RecordKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Post => RecordKind::Post,
            Kind::Habit => RecordKind::Habit,
            Kind::Community => RecordKind::Community,
            Kind::User => RecordKind::User,
        }
    }
}

#[derive(Args)]
pub struct QueryArgs {
    /// Query name (e.g. "select-posts")
    name: String,
    /// Parameters as a JSON object
    #[arg(long, default_value = "{}")]
    params: String,
    /// Normalize the returned records' identifiers as this kind
    #[arg(long, value_enum)]
    kind: Option<Kind>,
}

pub async fn run(args: QueryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params: Value = serde_json::from_str(&args.params)
        .map_err(|e| format!("--params is not valid JSON: {e}"))?;
    if !params.is_object() {
        return Err("--params must be a JSON object".into());
    }

    let config = Config::load()?;
    let client = QueryClient::from_config(&config.remote)?;
    let data = match args.kind {
        Some(kind) => Value::Array(client.fetch_records(&args.name, &params, kind.into()).await?),
        None => client.fetch(&args.name, &params).await?,
    };
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
