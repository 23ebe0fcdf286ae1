//! Login code gate.
//!
//! A code is first checked locally, then looked up remotely. The lookup
//! resolves a school id, and the school's descriptive info is fetched right
//! after. Authentication only completes when both calls succeed.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Settings, SettingsStore};
use crate::date::DateCodec;
use crate::error::{Error, Result};
use crate::model::{EntityType, LoginCode, LoginCodeField, SchoolInfo, SchoolSession};
use crate::net::{ApiClient, Endpoint, Transport};
use crate::schema::{parse_record, FieldKeys, RawObject};
use crate::session::GateState;
use crate::validate::validate_login_code;

pub struct SessionGate<T> {
    api: ApiClient<T>,
    store: SettingsStore,
    codec: DateCodec,
    code_length: usize,
    state: GateState,
    settings: Settings,
}

impl<T: Transport> SessionGate<T> {
    /// Gate restored from the settings at `store`.
    ///
    /// Unreadable settings are logged and replaced by defaults.
    pub fn new(api: ApiClient<T>, store: SettingsStore, codec: DateCodec, code_length: usize) -> Self {
        let settings = store.load().unwrap_or_else(|e| {
            warn!(path = %store.path().display(), error = %e, "Ignoring unreadable settings");
            Settings::default()
        });

        let state = if settings.school.is_some() && !settings.show_lock_screen {
            GateState::Authenticated
        } else {
            GateState::LoggedOut
        };

        Self {
            api,
            store,
            codec,
            code_length,
            state,
            settings,
        }
    }

    #[must_use]
    pub const fn state(&self) -> GateState {
        self.state
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn session(&self) -> Option<&SchoolSession> {
        self.settings.school.as_ref()
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Whether the application should present the lock screen.
    #[must_use]
    pub const fn should_show_lock_screen(&self) -> bool {
        self.settings.lock_screen_required()
    }

    /// Validate `code` and, on success, bind the session to its school.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLoginCode`] without any network call if the code is malformed
    /// - [`Error::CodeRejected`] if the server refuses the code
    /// - [`Error::Transport`] or [`Error::SchoolInfoIncomplete`] if either lookup
    ///   cannot be completed
    pub async fn submit_code(&mut self, code: &str) -> Result<SchoolSession> {
        if let Err(reason) = validate_login_code(code, self.code_length) {
            debug!(%reason, "Login code failed local validation");
            return Err(Error::InvalidLoginCode { reason });
        }

        self.state = GateState::Validating;
        match self.authenticate(code).await {
            Ok(session) => {
                self.state = GateState::Authenticated;
                self.settings.show_lock_screen = false;
                self.settings.school = Some(session.clone());
                if let Err(e) = self.store.save(&self.settings) {
                    warn!(error = %e, "Failed to persist session");
                }
                info!(school_id = %session.school_id, school = %session.name, "Authenticated");
                Ok(session)
            }
            Err(e) => {
                self.state = match e {
                    Error::CodeRejected { .. } => GateState::RejectedCode,
                    _ => GateState::NetworkError,
                };
                warn!(state = %self.state, error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// Show the lock screen again on next launch.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    pub fn rearm_lock_screen(&mut self) -> Result<()> {
        self.settings.show_lock_screen = true;
        self.state = GateState::LoggedOut;
        self.store.save(&self.settings)
    }

    async fn authenticate(&self, code: &str) -> Result<SchoolSession> {
        let response = self
            .api
            .fetch(&Endpoint::LoginCode {
                code: code.to_string(),
            })
            .await?;

        if response.status != 200 {
            return Err(Error::CodeRejected {
                status: response.status,
            });
        }

        let Some(school_id) = resolve_school_id(&response.body, code, &self.codec) else {
            warn!("Login response carries no school id");
            return Err(Error::CodeRejected {
                status: response.status,
            });
        };
        debug!(%school_id, "Code resolved");

        let info = self.fetch_school_info(&school_id).await?;
        Ok(info.into_session(school_id))
    }

    async fn fetch_school_info(&self, school_id: &str) -> Result<SchoolInfo> {
        let body = self
            .api
            .fetch_ok(&Endpoint::SchoolInfo {
                school_id: school_id.to_string(),
            })
            .await?;

        let incomplete = || Error::SchoolInfoIncomplete {
            school_id: school_id.to_string(),
        };

        let value: Value = serde_json::from_slice(&body).map_err(|_| incomplete())?;
        let first = match &value {
            Value::Array(items) => items.first().ok_or_else(incomplete)?,
            other => other,
        };

        parse_record::<SchoolInfo>(first, &FieldKeys::wire(), &self.codec).map_err(|e| {
            warn!(%school_id, error = %e, "School info incomplete");
            incomplete()
        })
    }
}

/// School id carried by a login lookup body.
///
/// The body is either an object with a `schoolId`, or an array of login
/// code records. In the array case only the record whose code matches
/// resolves, and a single malformed record resolves nothing.
fn resolve_school_id(body: &[u8], code: &str, codec: &DateCodec) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let keys = FieldKeys::<LoginCodeField>::wire();

    match &value {
        Value::Object(_) => RawObject::new(EntityType::LoginCode, &value, &keys)
            .ok()?
            .id(LoginCodeField::SchoolId)
            .ok(),
        Value::Array(items) => {
            let records = items
                .iter()
                .map(|item| parse_record::<LoginCode>(item, &keys, codec))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| warn!(error = %e, "Malformed login code record"))
                .ok()?;
            records
                .into_iter()
                .find(|r| r.code.eq_ignore_ascii_case(code))
                .map(|r| r.school_id)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::mock::MockTransport;
    use crate::net::TransportError;
    use serde_json::json;
    use tempfile::TempDir;

    const BASE: &str = "https://api.test";

    fn school_info_body() -> String {
        json!([{
            "name": "RUG Summer School",
            "startDate": "2024-07-01T00:00:00.000Z",
            "endDate": "2024-07-14T00:00:00.000Z"
        }])
        .to_string()
    }

    fn gate(transport: MockTransport, dir: &TempDir) -> SessionGate<MockTransport> {
        let api = ApiClient::new(transport, BASE).unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        SessionGate::new(api, store, DateCodec::utc(), 8)
    }

    #[tokio::test]
    async fn test_end_to_end_login() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new()
            .reply("/loginCode?code=AB12CD34", 200, json!({"schoolId": "S1"}).to_string())
            .reply("/school/item?id=S1", 200, school_info_body());
        let mut gate = gate(transport, &dir);
        assert!(gate.should_show_lock_screen());

        let session = gate.submit_code("AB12CD34").await.unwrap();

        assert_eq!(gate.state(), GateState::Authenticated);
        assert_eq!(session.school_id, "S1");
        assert_eq!(session.name, "RUG Summer School");
        assert!(!gate.should_show_lock_screen());

        let persisted = SettingsStore::new(dir.path().join("settings.json")).load().unwrap();
        assert_eq!(persisted.school.unwrap().school_id, "S1");
        assert!(!persisted.show_lock_screen);
    }

    #[tokio::test]
    async fn test_malformed_code_never_reaches_network() {
        let dir = TempDir::new().unwrap();
        let mut gate = gate(MockTransport::new(), &dir);

        for code in ["AB12CD3", "AB12CD345", "AB12-D34", "AB12 D34", ""] {
            let err = gate.submit_code(code).await.unwrap_err();
            assert!(matches!(err, Error::InvalidLoginCode { .. }), "{code:?}");
        }

        assert!(gate.api().transport().requests().is_empty());
        assert_eq!(gate.state(), GateState::LoggedOut);
    }

    #[tokio::test]
    async fn test_non_200_is_rejected_code() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().reply("/loginCode?code=ZZZZ9999", 404, "");
        let mut gate = gate(transport, &dir);

        let err = gate.submit_code("ZZZZ9999").await.unwrap_err();

        assert!(matches!(err, Error::CodeRejected { status: 404 }));
        assert_eq!(gate.state(), GateState::RejectedCode);
        assert!(gate.state().accepts_input());
        assert!(gate.session().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let dir = TempDir::new().unwrap();
        let transport =
            MockTransport::new().fail("/loginCode?code=AB12CD34", TransportError::Timeout);
        let mut gate = gate(transport, &dir);

        let err = gate.submit_code("AB12CD34").await.unwrap_err();

        assert!(matches!(err, Error::Transport(TransportError::Timeout)));
        assert_eq!(gate.state(), GateState::NetworkError);
    }

    #[tokio::test]
    async fn test_incomplete_school_info_fails_login() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new()
            .reply("/loginCode?code=AB12CD34", 200, json!({"schoolId": 7}).to_string())
            .reply("/school/item?id=7", 200, json!([{"name": "No dates"}]).to_string());
        let mut gate = gate(transport, &dir);

        let err = gate.submit_code("AB12CD34").await.unwrap_err();

        assert!(matches!(err, Error::SchoolInfoIncomplete { ref school_id } if school_id == "7"));
        assert_eq!(gate.state(), GateState::NetworkError);
        assert!(gate.should_show_lock_screen());
        assert!(!dir.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_array_response_matches_code() {
        let dir = TempDir::new().unwrap();
        let codes = json!([
            {"id": 1, "code": "OTHER123", "date": "2024-06-01T00:00:00.000Z", "schoolId": "S9"},
            {"id": 2, "code": "AB12CD34", "date": "2024-06-01T00:00:00.000Z", "schoolId": "S1"}
        ]);
        let transport = MockTransport::new()
            .reply("/loginCode?code=AB12CD34", 200, codes.to_string())
            .reply("/school/item?id=S1", 200, school_info_body());
        let mut gate = gate(transport, &dir);

        let session = gate.submit_code("AB12CD34").await.unwrap();
        assert_eq!(session.school_id, "S1");
    }

    #[tokio::test]
    async fn test_created_status_is_rejected_code() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new()
            .reply("/loginCode?code=AB12CD34", 201, json!({"schoolId": "S1"}).to_string())
            .reply("/school/item?id=S1", 200, school_info_body());
        let mut gate = gate(transport, &dir);

        let err = gate.submit_code("AB12CD34").await.unwrap_err();

        assert!(matches!(err, Error::CodeRejected { status: 201 }));
        assert_eq!(gate.state(), GateState::RejectedCode);
        assert_eq!(gate.api().transport().requests().len(), 1);
        assert!(gate.session().is_none());
    }

    #[tokio::test]
    async fn test_array_without_matching_code_is_rejected() {
        let dir = TempDir::new().unwrap();
        let codes = json!([
            {"id": 1, "code": "AB12CD34", "date": "2024-06-01T00:00:00.000Z", "schoolId": "S1"}
        ]);
        let transport = MockTransport::new()
            .reply("/loginCode?code=ZZZZ9999", 200, codes.to_string())
            .reply("/school/item?id=S1", 200, school_info_body());
        let mut gate = gate(transport, &dir);

        let err = gate.submit_code("ZZZZ9999").await.unwrap_err();

        assert!(matches!(err, Error::CodeRejected { status: 200 }));
        assert_eq!(gate.state(), GateState::RejectedCode);
        assert!(gate.session().is_none());
        assert!(!dir.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_malformed_record_in_array_is_rejected() {
        let dir = TempDir::new().unwrap();
        let codes = json!([
            {"id": 2, "code": "AB12CD34", "date": "2024-06-01T00:00:00.000Z", "schoolId": "S1"},
            {"id": 3, "code": "OTHER123", "schoolId": "S9"}
        ]);
        let transport = MockTransport::new()
            .reply("/loginCode?code=AB12CD34", 200, codes.to_string())
            .reply("/school/item?id=S1", 200, school_info_body());
        let mut gate = gate(transport, &dir);

        assert!(gate.submit_code("AB12CD34").await.is_err());
        assert_eq!(gate.state(), GateState::RejectedCode);
    }

    #[tokio::test]
    async fn test_school_info_failure_is_network_error() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new()
            .reply("/loginCode?code=AB12CD34", 200, json!({"schoolId": "S1"}).to_string())
            .fail("/school/item?id=S1", TransportError::Timeout);
        let mut gate = gate(transport, &dir);

        let err = gate.submit_code("AB12CD34").await.unwrap_err();

        assert!(matches!(err, Error::Transport(TransportError::Timeout)));
        assert_eq!(gate.state(), GateState::NetworkError);
        assert!(gate.should_show_lock_screen());
        assert!(gate.session().is_none());
        assert!(!dir.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_school_info_server_error_is_network_error() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new()
            .reply("/loginCode?code=AB12CD34", 200, json!({"schoolId": "S1"}).to_string())
            .reply("/school/item?id=S1", 500, "");
        let mut gate = gate(transport, &dir);

        let err = gate.submit_code("AB12CD34").await.unwrap_err();

        assert!(matches!(err, Error::Transport(TransportError::Status(500))));
        assert_eq!(gate.state(), GateState::NetworkError);
        assert!(!dir.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_ok_without_school_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let transport =
            MockTransport::new().reply("/loginCode?code=AB12CD34", 200, json!({}).to_string());
        let mut gate = gate(transport, &dir);

        assert!(gate.submit_code("AB12CD34").await.is_err());
        assert_eq!(gate.state(), GateState::RejectedCode);
    }

    #[tokio::test]
    async fn test_rearm_shows_lock_screen_but_keeps_school() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new()
            .reply("/loginCode?code=AB12CD34", 200, json!({"schoolId": "S1"}).to_string())
            .reply("/school/item?id=S1", 200, school_info_body());
        let mut first = gate(transport, &dir);
        first.submit_code("AB12CD34").await.unwrap();

        let restored = gate(MockTransport::new(), &dir);
        assert_eq!(restored.state(), GateState::Authenticated);

        let mut restored = restored;
        restored.rearm_lock_screen().unwrap();
        assert!(restored.should_show_lock_screen());
        assert_eq!(restored.state(), GateState::LoggedOut);
        assert_eq!(restored.session().unwrap().school_id, "S1");

        let reopened = gate(MockTransport::new(), &dir);
        assert!(reopened.should_show_lock_screen());
    }
}
