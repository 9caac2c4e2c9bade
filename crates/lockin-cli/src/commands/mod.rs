pub mod config;
pub mod focus;
pub mod query;
pub mod session;

/// Print one value as a single JSON line on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
