use tracing::debug;

use crate::backend::auth::{is_valid_email, MIN_PASSWORD_LEN};
use crate::backend::postgrest::TableApi;
use crate::backend::session::Session;
use crate::profile::dto::{Profile, ProfileDetails, ProfileSeed, SignUpForm};
use crate::profile::repo;

/// Validate the sign-up form and build the profile seed. Phone, farm area
/// and land revenue survey number must be numeric.
pub fn validate_sign_up(form: &SignUpForm) -> anyhow::Result<ProfileSeed> {
    if !is_valid_email(&form.email) {
        anyhow::bail!("please enter a valid email address");
    }
    if form.password.len() < MIN_PASSWORD_LEN {
        anyhow::bail!("password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    let phone = form
        .phone
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("please enter a valid phone number"))?;
    let farm_area = form
        .farm_area
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("please enter a valid farm area in numeric form"))?;
    let land_revenue_survey_no = form
        .land_revenue_survey_no
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("please enter a valid land revenue survey number"))?;

    Ok(ProfileSeed {
        full_name: form.full_name.clone(),
        phone,
        address: form.address.clone(),
        soil_type: form.soil_type.clone(),
        farm_area,
        referral_code: form.referral_code.clone(),
        land_revenue_survey_no,
        predictions_count: 0,
    })
}

/// Validate the editable details. Empty required fields block the save.
pub fn validate_details(details: &ProfileDetails) -> anyhow::Result<(String, i64, i64)> {
    if details.soil_type.trim().is_empty()
        || details.farm_area.trim().is_empty()
        || details.land_revenue_survey_no.trim().is_empty()
    {
        anyhow::bail!("please fill all the details");
    }
    let farm_area = details
        .farm_area
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("please enter a valid farm area in numeric form"))?;
    let land_revenue_survey_no = details
        .land_revenue_survey_no
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("please enter a valid land revenue survey number"))?;
    Ok((
        details.soil_type.trim().to_string(),
        farm_area,
        land_revenue_survey_no,
    ))
}

pub async fn load(tables: &dyn TableApi, session: &Session) -> anyhow::Result<Option<Profile>> {
    repo::fetch(tables, &session.access_token, session.user_id()).await
}

pub async fn save_details(
    tables: &dyn TableApi,
    session: &Session,
    details: &ProfileDetails,
) -> anyhow::Result<()> {
    let (soil_type, farm_area, survey_no) = validate_details(details)?;
    repo::update_details(
        tables,
        &session.access_token,
        session.user_id(),
        &soil_type,
        farm_area,
        survey_no,
    )
    .await?;
    debug!(user_id = %session.user_id(), "profile details saved");
    Ok(())
}

pub async fn submit_referral(
    tables: &dyn TableApi,
    session: &Session,
    referral_code: &str,
) -> anyhow::Result<()> {
    let code = referral_code.trim();
    if code.is_empty() {
        anyhow::bail!("referral code must not be empty");
    }
    repo::update_referral(tables, &session.access_token, session.user_id(), code).await
}

/// Persist the bumped prediction counter after a saved prediction.
pub async fn record_saved_prediction(
    tables: &dyn TableApi,
    session: &Session,
    profile: &Profile,
) -> anyhow::Result<()> {
    repo::set_predictions_count(
        tables,
        &session.access_token,
        session.user_id(),
        profile.predictions_count + 1,
    )
    .await
}
