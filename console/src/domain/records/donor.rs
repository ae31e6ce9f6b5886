//! Registered blood donors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Address, AdminResource};
use crate::domain::query::{Queryable, SortValue};

/// Categorical field holding the donor's blood group.
pub const BLOOD_GROUP_FIELD: &str = "bloodGroup";
/// Categorical field holding [`Eligibility`].
pub const ELIGIBILITY_FIELD: &str = "eligibility";

/// Donation eligibility as filtered by the donor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Eligibility {
    /// Cleared to donate.
    Eligible,
    /// Not cleared, or not yet assessed.
    Ineligible,
}

impl Eligibility {
    /// Filter value for this eligibility.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eligible => "eligible",
            Self::Ineligible => "ineligible",
        }
    }
}

/// Donor document as returned by `GET /admin/donors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    /// Backend identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Full name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub phone: Option<String>,
    /// ABO/Rh group, for example `O+`.
    #[serde(default)]
    pub blood_group: Option<String>,
    /// `None` until the donor has been assessed.
    #[serde(default)]
    pub eligible_to_donate: Option<bool>,
    /// Age in years.
    #[serde(default)]
    pub age: Option<u32>,
    /// Weight in kilograms.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<Address>,
    /// Past donations; only the count is used by the console.
    #[serde(default)]
    pub donation_history: Option<Vec<Value>>,
}

impl Donor {
    /// Eligibility bucket; an unassessed donor counts as ineligible.
    pub fn eligibility(&self) -> Eligibility {
        if self.eligible_to_donate == Some(true) {
            Eligibility::Eligible
        } else {
            Eligibility::Ineligible
        }
    }

    /// Number of recorded donations.
    pub fn donation_count(&self) -> usize {
        self.donation_history.as_ref().map_or(0, Vec::len)
    }
}

impl Queryable for Donor {
    fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or_default()
    }

    fn search_fields(&self) -> Vec<&str> {
        [&self.full_name, &self.email, &self.phone]
            .into_iter()
            .filter_map(Option::as_deref)
            .collect()
    }

    fn categorical_value(&self, field: &str) -> Option<&str> {
        match field {
            BLOOD_GROUP_FIELD => self.blood_group.as_deref(),
            ELIGIBILITY_FIELD => Some(self.eligibility().as_str()),
            _ => None,
        }
    }

    fn sort_value(&self, key: &str) -> Option<SortValue<'_>> {
        match key {
            "name" => Some(SortValue::Text(self.display_name())),
            "age" => Some(SortValue::Number(self.age.map_or(0, i64::from))),
            "donations" => Some(SortValue::Number(
                i64::try_from(self.donation_count()).unwrap_or(i64::MAX),
            )),
            _ => None,
        }
    }
}

impl AdminResource for Donor {
    const LIST_PATH: &'static str = "/admin/donors";
    const ENVELOPE_KEY: &'static str = "donors";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Headline counters over the full donor list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorSummary {
    /// Donors listed.
    pub total: usize,
    /// Donors cleared to donate.
    pub eligible: usize,
    /// Donors not cleared or not assessed.
    pub ineligible: usize,
    /// Donations across every donor.
    pub total_donations: usize,
}

impl DonorSummary {
    /// Count over `donors`, ignoring any active filter.
    pub fn from_donors<'a>(donors: impl IntoIterator<Item = &'a Donor>) -> Self {
        donors
            .into_iter()
            .fold(Self::default(), |mut summary, donor| {
                summary.total += 1;
                match donor.eligibility() {
                    Eligibility::Eligible => summary.eligible += 1,
                    Eligibility::Ineligible => summary.ineligible += 1,
                }
                summary.total_donations += donor.donation_count();
                summary
            })
    }
}
