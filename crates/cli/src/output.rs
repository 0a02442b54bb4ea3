//! Table rows for list results

use serde::Deserialize;
use serde_json::Value;
use tabled::{Table, Tabled};

fn or_dash(v: &Option<String>) -> String {
    v.clone().unwrap_or_else(|| "-".to_string())
}

#[derive(Deserialize, Tabled)]
pub struct VentureRow {
    pub id: String,
    pub status: String,
    #[tabled(display_with = "or_dash")]
    pub tier: Option<String>,
    #[tabled(rename = "product")]
    pub current_product: String,
    #[tabled(rename = "rag", display_with = "or_dash")]
    pub overall_rag: Option<String>,
}

#[derive(Deserialize, Tabled)]
pub struct ChainRow {
    #[tabled(rename = "#")]
    pub sequence_number: i32,
    pub id: String,
    #[tabled(rename = "role")]
    pub approver_role: String,
    #[tabled(rename = "approver")]
    pub approver_id: String,
    pub status: String,
    #[tabled(display_with = "or_dash")]
    pub notes: Option<String>,
}

#[derive(Deserialize, Tabled)]
pub struct StreamRow {
    #[tabled(rename = "#")]
    pub stream_number: i32,
    pub id: String,
    #[tabled(rename = "stream")]
    pub stream_name: String,
    #[tabled(rename = "self", display_with = "or_dash")]
    pub self_status: Option<String>,
    #[tabled(rename = "support", display_with = "or_dash")]
    pub support_type: Option<String>,
    #[tabled(rename = "rag", display_with = "or_dash")]
    pub rag_status: Option<String>,
}

#[derive(Deserialize, Tabled)]
pub struct ProfileRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Deserialize, Tabled)]
pub struct MentorRequestRow {
    pub id: String,
    pub venture_id: String,
    pub stream_id: String,
    pub mentor_id: String,
    pub status: String,
}

/// Render a JSON array as a table of `T` rows
pub fn table<T>(value: Value) -> anyhow::Result<String>
where
    T: Tabled + for<'de> Deserialize<'de>,
{
    let rows: Vec<T> = serde_json::from_value(value)?;
    if rows.is_empty() {
        return Ok("(none)".to_string());
    }
    Ok(Table::new(rows).to_string())
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
