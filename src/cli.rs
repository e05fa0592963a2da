use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use crate::history::services as history_services;
use crate::inference::dto::{SensorField, SensorForm};
use crate::inference::flow::{FailedStage, FlowState, PredictionFlow};
use crate::profile::dto::{ProfileDetails, SignUpForm};
use crate::profile::services as profile_services;
use crate::state::AppState;
use crate::store::SessionStore;

/// Shown in place of the description when the describe call failed.
const DESCRIPTION_FALLBACK_HTML: &str =
    "<p>Description is currently unavailable. Please try again later.</p>";

#[derive(Debug, Parser)]
#[command(name = "vinewise", version, about = "Grape cultivation advisory client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register with email/password and farm details
    Signup(SignUpArgs),
    /// Sign in with email and password
    Signin {
        #[arg(long, env = "VINEWISE_EMAIL")]
        email: String,
        #[arg(long, env = "VINEWISE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in by exchanging a Google-issued id token
    SigninGoogle {
        #[arg(long)]
        id_token: String,
    },
    /// Sign out and drop the local session
    Signout,
    /// Submit sensor readings and show the prediction
    Predict(PredictArgs),
    /// List past predictions, newest first
    History,
    /// Show or edit the farm profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Debug, Args)]
pub struct SignUpArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub soil_type: String,
    #[arg(long)]
    pub farm_area: String,
    #[arg(long, default_value = "")]
    pub referral_code: String,
    #[arg(long)]
    pub survey_no: String,
}

/// The eight readings are taken as raw text; anything that does not parse
/// as a number goes to the service as zero.
#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long, default_value = "")]
    pub solar_radiation: String,
    #[arg(long, default_value = "")]
    pub humidity: String,
    #[arg(long, default_value = "")]
    pub conductivity: String,
    #[arg(long, default_value = "")]
    pub phosphorus: String,
    #[arg(long, default_value = "")]
    pub ph_value: String,
    #[arg(long, default_value = "")]
    pub temperature: String,
    #[arg(long, default_value = "")]
    pub nitrogen: String,
    #[arg(long, default_value = "")]
    pub potassium: String,
    /// Persist the result into the prediction history
    #[arg(long)]
    pub save: bool,
}

impl PredictArgs {
    fn form(&self) -> SensorForm {
        let mut form = SensorForm::new();
        form.set(SensorField::SolarRadiation, self.solar_radiation.clone());
        form.set(SensorField::Humidity, self.humidity.clone());
        form.set(SensorField::Conductivity, self.conductivity.clone());
        form.set(SensorField::Phosphorus, self.phosphorus.clone());
        form.set(SensorField::PhValue, self.ph_value.clone());
        form.set(SensorField::Temperature, self.temperature.clone());
        form.set(SensorField::Nitrogen, self.nitrogen.clone());
        form.set(SensorField::Potassium, self.potassium.clone());
        form
    }
}

#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// Print the current profile
    Show,
    /// Update the editable farm details
    Update {
        #[arg(long)]
        soil_type: String,
        #[arg(long)]
        farm_area: String,
        #[arg(long)]
        survey_no: String,
    },
    /// Submit a referral code
    Refer {
        #[arg(long)]
        code: String,
    },
}

fn render_result(
    result: &crate::inference::dto::PredictionResult,
    description: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Predicted disease: {}\n\n", result.disease));
    out.push_str("Pest attack probabilities:\n");
    for (pest, probability) in result.pest_attacks() {
        out.push_str(&format!("  {:<24} {:>6.2}%\n", pest, probability));
    }
    out.push_str("\n");
    out.push_str(description);
    out
}

pub async fn run(state: AppState, cli: Cli) -> anyhow::Result<()> {
    let mut store = SessionStore::new();
    if let Some(session) = state.restore_session().await? {
        store.set_session(session);
    }

    match cli.command {
        Command::Signup(args) => {
            let form = SignUpForm {
                email: args.email,
                password: args.password,
                full_name: args.full_name,
                phone: args.phone,
                address: args.address,
                soil_type: args.soil_type,
                farm_area: args.farm_area,
                referral_code: args.referral_code,
                land_revenue_survey_no: args.survey_no,
            };
            let seed = profile_services::validate_sign_up(&form)?;
            let session = state
                .auth
                .sign_up(&form.email, &form.password, serde_json::to_value(&seed)?)
                .await?;
            state.persist_session(&session)?;
            info!(user_id = %session.user_id(), "sign-up successful");
            store.set_session(session);
            println!("Sign-up successful.");
        }

        Command::Signin { email, password } => {
            let session = state.auth.sign_in_password(&email, &password).await?;
            state.persist_session(&session)?;
            info!(user_id = %session.user_id(), "signed in");
            store.set_session(session);
            println!("Signed in as {}.", email);
        }

        Command::SigninGoogle { id_token } => {
            let session = state.auth.sign_in_id_token("google", &id_token).await?;
            state.persist_session(&session)?;
            info!(user_id = %session.user_id(), "signed in via google");
            store.set_session(session);
            println!("Signed in with Google.");
        }

        Command::Signout => {
            if let Some(session) = store.session() {
                if let Err(e) = state.auth.sign_out(&session.access_token).await {
                    warn!(error = %e, "remote sign-out failed; clearing local session anyway");
                }
            }
            state.forget_session()?;
            store.clear();
            println!("Signed out.");
        }

        Command::Predict(args) => {
            let reading = args.form().reading();
            let mut flow = PredictionFlow::new();
            flow.submit(state.inference.as_ref(), &reading).await?;

            match flow.state() {
                FlowState::Ready {
                    result,
                    description,
                } => {
                    println!("{}", render_result(result, description));
                    if args.save {
                        let session = state.require_session().await?;
                        history_services::save_prediction(
                            state.tables.as_ref(),
                            &session,
                            result,
                            None,
                        )
                        .await?;
                        if let Some(profile) =
                            profile_services::load(state.tables.as_ref(), &session).await?
                        {
                            profile_services::record_saved_prediction(
                                state.tables.as_ref(),
                                &session,
                                &profile,
                            )
                            .await?;
                            store.set_profile(Some(profile));
                            store.record_saved();
                        }
                        println!("Saved to history.");
                    }
                }
                FlowState::Error { stage, message } => {
                    if *stage == FailedStage::Describe {
                        println!("{}", DESCRIPTION_FALLBACK_HTML);
                    }
                    anyhow::bail!("prediction failed: {}", message);
                }
                // submit() always lands in Ready or Error
                other => anyhow::bail!("unexpected flow state {:?}", other),
            }
        }

        Command::History => {
            let session = state.require_session().await?;
            let history = history_services::load_history(state.tables.as_ref(), &session).await?;
            if history.is_empty() {
                println!("No predictions yet.");
            } else {
                for entry in &history {
                    let date = entry.created_at.date();
                    let t = entry.created_at.time();
                    println!(
                        "{}  {:02}:{:02}  {}{}",
                        date,
                        t.hour(),
                        t.minute(),
                        entry.disease,
                        entry
                            .pdf_url
                            .as_deref()
                            .map(|u| format!("  [{}]", u))
                            .unwrap_or_default(),
                    );
                }
                store.set_history(history);
            }
        }

        Command::Profile { action } => {
            let session = state.require_session().await?;
            match action {
                ProfileAction::Show => {
                    match profile_services::load(state.tables.as_ref(), &session).await? {
                        Some(profile) => {
                            println!("Name:        {}", profile.full_name);
                            if let Some(email) = &session.user.email {
                                println!("Email:       {}", email);
                            }
                            println!("Phone:       {}", profile.phone);
                            println!("Address:     {}", profile.address);
                            println!("Soil type:   {}", profile.soil_type);
                            println!("Farm area:   {} acres", profile.farm_area);
                            println!("Survey no:   {}", profile.land_revenue_survey_no);
                            if let Some(code) = &profile.referral_code {
                                println!("Referral:    {}", code);
                            }
                            println!("Predictions: {}", profile.predictions_count);
                            store.set_profile(Some(profile));
                        }
                        None => println!("No profile found for this account."),
                    }
                }
                ProfileAction::Update {
                    soil_type,
                    farm_area,
                    survey_no,
                } => {
                    let details = ProfileDetails {
                        soil_type,
                        farm_area,
                        land_revenue_survey_no: survey_no,
                    };
                    profile_services::save_details(state.tables.as_ref(), &session, &details)
                        .await?;
                    println!("Profile updated successfully.");
                }
                ProfileAction::Refer { code } => {
                    profile_services::submit_referral(state.tables.as_ref(), &session, &code)
                        .await?;
                    println!("Referral code {} submitted.", code);
                }
            }
        }
    }

    Ok(())
}
