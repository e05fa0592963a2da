use anyhow::Context;
use uuid::Uuid;

use crate::backend::postgrest::{eq_filter, TableApi};
use crate::history::dto::{HistoryEntry, NewPrediction};

const TABLE: &str = "predictions";

pub async fn insert(
    tables: &dyn TableApi,
    access_token: &str,
    row: &NewPrediction,
) -> anyhow::Result<()> {
    tables
        .insert(access_token, TABLE, serde_json::to_value(row)?)
        .await
        .context("insert prediction")?;
    Ok(())
}

/// All history rows for a user, newest first. No pagination.
pub async fn list_by_user(
    tables: &dyn TableApi,
    access_token: &str,
    user_id: Uuid,
) -> anyhow::Result<Vec<HistoryEntry>> {
    let rows = tables
        .select(
            access_token,
            TABLE,
            &eq_filter("user_id", user_id),
            Some("created_at.desc"),
        )
        .await
        .context("select predictions")?;
    let entries: Vec<HistoryEntry> =
        serde_json::from_value(rows).context("parse prediction rows")?;
    Ok(entries)
}
