use anyhow::Context;
use serde_json::json;
use uuid::Uuid;

use crate::backend::postgrest::{eq_filter, TableApi};
use crate::profile::dto::Profile;

const TABLE: &str = "profiles";

/// Fetch the profile row for a user, if one exists.
pub async fn fetch(
    tables: &dyn TableApi,
    access_token: &str,
    user_id: Uuid,
) -> anyhow::Result<Option<Profile>> {
    let rows = tables
        .select(access_token, TABLE, &eq_filter("id", user_id), None)
        .await
        .context("select profile")?;
    let row = match rows.as_array().and_then(|a| a.first()) {
        Some(row) => row.clone(),
        None => return Ok(None),
    };
    let profile: Profile = serde_json::from_value(row).context("parse profile row")?;
    Ok(Some(profile))
}

pub async fn update_details(
    tables: &dyn TableApi,
    access_token: &str,
    user_id: Uuid,
    soil_type: &str,
    farm_area: i64,
    land_revenue_survey_no: i64,
) -> anyhow::Result<()> {
    tables
        .update(
            access_token,
            TABLE,
            &eq_filter("id", user_id),
            json!({
                "soil_type": soil_type,
                "farm_area": farm_area,
                "land_revenue_survey_no": land_revenue_survey_no,
            }),
        )
        .await
        .context("update profile details")?;
    Ok(())
}

pub async fn update_referral(
    tables: &dyn TableApi,
    access_token: &str,
    user_id: Uuid,
    referral_code: &str,
) -> anyhow::Result<()> {
    tables
        .update(
            access_token,
            TABLE,
            &eq_filter("id", user_id),
            json!({ "referral_code": referral_code }),
        )
        .await
        .context("update referral code")?;
    Ok(())
}

pub async fn set_predictions_count(
    tables: &dyn TableApi,
    access_token: &str,
    user_id: Uuid,
    count: i64,
) -> anyhow::Result<()> {
    tables
        .update(
            access_token,
            TABLE,
            &eq_filter("id", user_id),
            json!({ "predictions_count": count }),
        )
        .await
        .context("update predictions count")?;
    Ok(())
}
