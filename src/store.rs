use crate::backend::session::Session;
use crate::history::dto::HistoryEntry;
use crate::profile::dto::Profile;

/// In-process session/profile/history state, owned by the composition
/// root. One writer, explicit update methods; nothing here is shared
/// across tasks.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: Option<Session>,
    profile: Option<Profile>,
    history: Vec<HistoryEntry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Replace the session. Profile and history belong to the previous
    /// identity, so they are dropped and re-fetched on demand.
    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
        self.profile = None;
        self.history.clear();
    }

    /// Sign-out wipes everything.
    pub fn clear(&mut self) {
        self.session = None;
        self.profile = None;
        self.history.clear();
    }

    pub fn set_profile(&mut self, profile: Option<Profile>) {
        self.profile = profile;
    }

    pub fn set_history(&mut self, history: Vec<HistoryEntry>) {
        self.history = history;
    }

    /// Reflect a just-saved prediction without a round trip: bump the
    /// in-memory counter to match the persisted one.
    pub fn record_saved(&mut self) {
        if let Some(profile) = self.profile.as_mut() {
            profile.predictions_count += 1;
        }
    }
}

#[cfg(test)]
mod store_tests {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::backend::session::SessionUser;

    fn session() -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
            user: SessionUser {
                id: Uuid::new_v4(),
                email: None,
            },
        }
    }

    fn profile(id: Uuid) -> Profile {
        Profile {
            id,
            full_name: "R. Patil".into(),
            phone: 9876543210,
            address: "Nashik".into(),
            soil_type: "Black".into(),
            farm_area: 12,
            referral_code: None,
            land_revenue_survey_no: 4471,
            predictions_count: 3,
        }
    }

    #[test]
    fn new_session_drops_previous_identity_state() {
        let mut store = SessionStore::new();
        let first = session();
        store.set_session(first.clone());
        store.set_profile(Some(profile(first.user_id())));
        assert!(store.profile().is_some());

        store.set_session(session());
        assert!(store.profile().is_none());
        assert!(store.history().is_empty());
    }

    #[test]
    fn clear_wipes_everything() {
        let mut store = SessionStore::new();
        let s = session();
        store.set_session(s.clone());
        store.set_profile(Some(profile(s.user_id())));
        store.clear();
        assert!(store.session().is_none());
        assert!(store.profile().is_none());
    }

    #[test]
    fn record_saved_bumps_the_counter() {
        let mut store = SessionStore::new();
        let s = session();
        let id = s.user_id();
        store.set_session(s);
        store.set_profile(Some(profile(id)));
        store.record_saved();
        assert_eq!(store.profile().expect("profile").predictions_count, 4);

        // No profile loaded: nothing to bump, nothing to panic over.
        store.set_profile(None);
        store.record_saved();
    }
}
