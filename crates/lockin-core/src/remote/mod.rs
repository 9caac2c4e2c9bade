//! Collaborators shared by the social screens: the remote query backend
//! and the identifier conventions of its records.

mod client;
pub mod records;

pub use client::{escape_sql_literal, QueryClient, QueryResponse};
pub use records::{normalize, resolve_id, RecordId, RecordKind};
