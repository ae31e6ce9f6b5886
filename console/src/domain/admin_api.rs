//! Typed facade over the admin HTTP surface.
//!
//! Every call goes through the session's
//! [`ResourceFetcher`](crate::domain::ports::ResourceFetcher) with the stored
//! credential. A rejected credential is cleared before the error is returned,
//! so the next bootstrap sends the user to the login page.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::domain::ports::{FetchError, FetchRequest};
use crate::domain::records::{AdminResource, DashboardStats};
use crate::domain::{Credential, Error, SessionContext};

/// Path of the dashboard counters.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";
const APPROVE_PATH: &str = "/admin/facility/approve";
const REJECT_PATH: &str = "/admin/facility/reject";

/// Admin operations bound to one session.
#[derive(Clone)]
pub struct AdminApi {
    context: Arc<SessionContext>,
}

impl AdminApi {
    /// Bind the API to a session.
    pub fn new(context: Arc<SessionContext>) -> Self {
        Self { context }
    }

    /// Fetch every record of one collection.
    ///
    /// A missing or `null` envelope key reads as an empty collection.
    ///
    /// # Errors
    ///
    /// [`Error`] with `unauthorized` when no credential is stored or the
    /// backend rejects it, `service_unavailable` for transport failures, and
    /// `upstream_error` for backend failures or undecodable records.
    pub async fn list<R: AdminResource>(&self) -> Result<Vec<R>, Error> {
        let payload = self.send(FetchRequest::get(R::LIST_PATH, self.credential()?)).await?;
        let records = match payload {
            Value::Object(mut envelope) => envelope.remove(R::ENVELOPE_KEY).unwrap_or(Value::Null),
            Value::Null => Value::Null,
            other => {
                return Err(Error::upstream(format!(
                    "expected an object from {}, found {}",
                    R::LIST_PATH,
                    json_kind(&other)
                )));
            }
        };
        if records.is_null() {
            return Ok(Vec::new());
        }
        let records: Vec<R> = serde_json::from_value(records).map_err(|error| {
            warn!(path = R::LIST_PATH, %error, "collection payload undecodable");
            Error::upstream(format!("unreadable {} list: {error}", R::ENVELOPE_KEY))
        })?;
        info!(path = R::LIST_PATH, count = records.len(), "collection loaded");
        Ok(records)
    }

    /// Fetch dashboard counters.
    ///
    /// # Errors
    ///
    /// As for [`AdminApi::list`].
    pub async fn dashboard(&self) -> Result<DashboardStats, Error> {
        let payload = self.send(FetchRequest::get(DASHBOARD_PATH, self.credential()?)).await?;
        if payload.is_null() {
            return Ok(DashboardStats::default());
        }
        serde_json::from_value(payload)
            .map_err(|error| Error::upstream(format!("unreadable dashboard stats: {error}")))
    }

    /// Approve a pending facility; returns the backend's confirmation.
    ///
    /// # Errors
    ///
    /// `invalid_request` for a blank or malformed id (no call is made);
    /// `upstream_error` when the backend does not confirm; otherwise as for
    /// [`AdminApi::list`].
    pub async fn approve_facility(&self, id: &str) -> Result<String, Error> {
        let id = validate_id(id)?;
        let request = FetchRequest::put(format!("{APPROVE_PATH}/{id}"), self.credential()?);
        let message = confirmation(self.send(request).await?)?;
        info!(facility = id, "facility approved");
        Ok(message)
    }

    /// Reject a pending facility with a reason; returns the confirmation.
    ///
    /// # Errors
    ///
    /// `invalid_request` for a blank reason or a bad id (no call is made);
    /// otherwise as for [`AdminApi::approve_facility`].
    pub async fn reject_facility(&self, id: &str, reason: &str) -> Result<String, Error> {
        let id = validate_id(id)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::invalid_request("rejection reason is required"));
        }
        let request = FetchRequest::put(format!("{REJECT_PATH}/{id}"), self.credential()?)
            .with_body(json!({ "rejectionReason": reason }));
        let message = confirmation(self.send(request).await?)?;
        info!(facility = id, "facility rejected");
        Ok(message)
    }

    fn credential(&self) -> Result<Credential, Error> {
        self.context
            .credentials()
            .get()
            .ok_or_else(|| Error::unauthorized("not signed in"))
    }

    async fn send(&self, request: FetchRequest) -> Result<Value, Error> {
        let method = request.method;
        let path = request.path.clone();
        match self.context.fetcher().request(request).await {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(%method, path = %path, kind = error.kind(), %error, "admin request failed");
                if matches!(error, FetchError::Auth { .. }) {
                    self.context.credentials().clear();
                }
                Err(Error::from(error))
            }
        }
    }
}

fn validate_id(raw: &str) -> Result<&str, Error> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(Error::invalid_request("facility id is required"));
    }
    if !id
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(Error::invalid_request(format!("invalid facility id: {id}")));
    }
    Ok(id)
}

fn confirmation(payload: Value) -> Result<String, Error> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::upstream("backend did not confirm the action"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
