//! Domain records fetched from the admin API.
//!
//! Records are immutable snapshots of backend documents. Field names follow
//! the backend's camelCase JSON; every attribute the portals treat as
//! optional is optional here too.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::query::Queryable;

mod dashboard;
mod donor;
mod facility;

pub use dashboard::{ActivityEntry, DashboardStats};
pub use donor::{BLOOD_GROUP_FIELD, Donor, DonorSummary, ELIGIBILITY_FIELD, Eligibility};
pub use facility::{FACILITY_TYPE_FIELD, Facility, FacilityStatus, OperatingHours, STATUS_FIELD};

/// Postal address shared by donors and facilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    /// Street line.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or region.
    pub state: Option<String>,
    /// Postal code; the backend sends it as a string or a number.
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: Option<String>,
}

/// A record type listed by one admin collection endpoint.
pub trait AdminResource: Queryable + DeserializeOwned + Serialize + Send + Sync {
    /// Collection path below the API base.
    const LIST_PATH: &'static str;
    /// Key of the array inside the list envelope.
    const ENVELOPE_KEY: &'static str;

    /// Backend identifier.
    fn id(&self) -> &str;
}

/// Accept a JSON string or number and keep it as text.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}
