//! Hospitals and blood banks registered with the network.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Address, AdminResource};
use crate::domain::query::{Queryable, SortValue};

/// Categorical field holding [`FacilityStatus`].
pub const STATUS_FIELD: &str = "status";
/// Categorical field holding the facility type.
pub const FACILITY_TYPE_FIELD: &str = "facilityType";

/// Review status of a facility registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityStatus {
    /// Awaiting admin review.
    Pending,
    /// Approved by an admin.
    Approved,
    /// Rejected by an admin.
    Rejected,
    /// Status missing or not recognised.
    #[default]
    #[serde(other)]
    Unknown,
}

impl FacilityStatus {
    /// Filter value for this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opening times shown on the facility detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperatingHours {
    /// Opening time as entered by the facility.
    pub open: Option<String>,
    /// Closing time as entered by the facility.
    pub close: Option<String>,
    /// Days the facility operates.
    pub working_days: Vec<String>,
}

/// Facility document as returned by `GET /admin/facilities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// Backend identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Registered name.
    #[serde(default)]
    pub name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub phone: Option<String>,
    /// Facility kind, for example `hospital` or `blood-bank`.
    #[serde(default)]
    pub facility_type: Option<String>,
    /// Government registration number.
    #[serde(default)]
    pub registration_number: Option<String>,
    /// Review status.
    #[serde(default)]
    pub status: FacilityStatus,
    /// Postal address.
    #[serde(default)]
    pub address: Option<Address>,
    /// Registration time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Uploaded documents, passed through untouched.
    #[serde(default)]
    pub documents: Option<Value>,
    /// Opening times.
    #[serde(default)]
    pub operating_hours: Option<OperatingHours>,
}

impl Facility {
    /// Whether the registration still awaits review.
    pub fn is_pending(&self) -> bool {
        self.status == FacilityStatus::Pending
    }
}

impl Queryable for Facility {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.registration_number,
        ]
        .into_iter()
        .filter_map(Option::as_deref)
        .collect()
    }

    fn categorical_value(&self, field: &str) -> Option<&str> {
        match field {
            STATUS_FIELD => Some(self.status.as_str()),
            FACILITY_TYPE_FIELD => self.facility_type.as_deref(),
            _ => None,
        }
    }

    fn sort_value(&self, key: &str) -> Option<SortValue<'_>> {
        match key {
            "name" => Some(SortValue::Text(self.display_name())),
            "type" => Some(SortValue::Text(
                self.facility_type.as_deref().unwrap_or_default(),
            )),
            "createdAt" => Some(SortValue::Number(
                self.created_at.map_or(0, |at| at.timestamp()),
            )),
            _ => None,
        }
    }
}

impl AdminResource for Facility {
    const LIST_PATH: &'static str = "/admin/facilities";
    const ENVELOPE_KEY: &'static str = "facilities";

    fn id(&self) -> &str {
        &self.id
    }
}
