use tracing::debug;

use crate::backend::postgrest::TableApi;
use crate::backend::session::Session;
use crate::history::dto::{HistoryEntry, NewPrediction};
use crate::history::repo;
use crate::inference::dto::PredictionResult;

/// Persist a completed prediction: exactly one insert carrying the
/// session's user id and the disease label. On failure nothing else was
/// mutated, so the caller just surfaces the error.
pub async fn save_prediction(
    tables: &dyn TableApi,
    session: &Session,
    result: &PredictionResult,
    pdf_url: Option<String>,
) -> anyhow::Result<()> {
    let row = NewPrediction {
        user_id: session.user_id(),
        disease: result.disease.clone(),
        pdf_url,
    };
    repo::insert(tables, &session.access_token, &row).await?;
    debug!(user_id = %session.user_id(), disease = %result.disease, "prediction saved");
    Ok(())
}

pub async fn load_history(
    tables: &dyn TableApi,
    session: &Session,
) -> anyhow::Result<Vec<HistoryEntry>> {
    repo::list_by_user(tables, &session.access_token, session.user_id()).await
}

#[cfg(test)]
mod save_tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::backend::session::SessionUser;
    use crate::backend::BackendError;

    #[derive(Default)]
    struct RecordingTables {
        inserts: Mutex<Vec<(String, Value)>>,
        select_response: Mutex<Option<Value>>,
    }

    #[async_trait]
    impl TableApi for RecordingTables {
        async fn select(
            &self,
            _access_token: &str,
            _table: &str,
            _filter: &str,
            _order: Option<&str>,
        ) -> Result<Value, BackendError> {
            Ok(self
                .select_response
                .lock()
                .expect("lock")
                .clone()
                .unwrap_or_else(|| Value::Array(vec![])))
        }

        async fn insert(
            &self,
            _access_token: &str,
            table: &str,
            row: Value,
        ) -> Result<(), BackendError> {
            self.inserts
                .lock()
                .expect("lock")
                .push((table.to_string(), row));
            Ok(())
        }

        async fn update(
            &self,
            _access_token: &str,
            _table: &str,
            _filter: &str,
            _patch: Value,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn session_for(user_id: Uuid) -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
            user: SessionUser {
                id: user_id,
                email: Some("farmer@example.com".into()),
            },
        }
    }

    fn example_result() -> PredictionResult {
        PredictionResult {
            disease: "Powdery Mildew".into(),
            flea_beetle: 12.0,
            thrips: 5.0,
            mealybug: 8.0,
            jassids: 3.0,
            red_spider_mites: 15.0,
            leaf_eating_caterpillar: 2.0,
        }
    }

    #[tokio::test]
    async fn save_produces_exactly_one_insert_with_user_and_disease() {
        let tables = RecordingTables::default();
        let user_id = Uuid::new_v4();
        let session = session_for(user_id);

        save_prediction(&tables, &session, &example_result(), None)
            .await
            .expect("save");

        let inserts = tables.inserts.lock().expect("lock");
        assert_eq!(inserts.len(), 1);
        let (table, row) = &inserts[0];
        assert_eq!(table, "predictions");
        assert_eq!(row["user_id"], user_id.to_string());
        assert_eq!(row["disease"], "Powdery Mildew");
        assert!(row.get("pdf_url").is_none());
    }

    #[tokio::test]
    async fn history_parses_rows_for_the_user() {
        let tables = RecordingTables::default();
        let user_id = Uuid::new_v4();
        *tables.select_response.lock().expect("lock") = Some(serde_json::json!([
            {
                "id": 2,
                "user_id": user_id,
                "disease": "Downy Mildew",
                "pdf_url": null,
                "created_at": "2025-11-03T09:15:00+00:00"
            },
            {
                "id": 1,
                "user_id": user_id,
                "disease": "Powdery Mildew",
                "pdf_url": "reports/1.pdf",
                "created_at": "2025-10-01T18:00:00+00:00"
            }
        ]));

        let history = load_history(&tables, &session_for(user_id))
            .await
            .expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].disease, "Downy Mildew");
        assert_eq!(history[1].pdf_url.as_deref(), Some("reports/1.pdf"));
    }
}
