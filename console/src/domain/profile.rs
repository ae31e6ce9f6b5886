//! Authenticated user profile and role matching.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role name carried by a profile or expected by a portal.
///
/// Comparison is case-insensitive: `Admin`, `ADMIN` and `admin` are the same
/// role.
///
/// # Examples
/// ```
/// use bloodbank_console::domain::Role;
///
/// let expected = Role::new("admin").unwrap();
/// assert!(Role::new("Admin").unwrap().matches(&expected));
/// assert!(!Role::new("donor").unwrap().matches(&expected));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

/// Error returned for blank role names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleValidationError;

impl fmt::Display for RoleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("role must not be empty")
    }
}

impl std::error::Error for RoleValidationError {}

/// Role required by every admin portal view.
pub const ADMIN_ROLE: &str = "admin";

impl Role {
    /// Validate and wrap a role name.
    pub fn new(raw: impl Into<String>) -> Result<Self, RoleValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(RoleValidationError);
        }
        Ok(Self(raw))
    }

    /// The administrator role.
    pub fn admin() -> Self {
        Self(ADMIN_ROLE.to_owned())
    }

    /// Case-insensitive role equality.
    pub fn matches(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }

    /// Role name as received.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Role {
    type Error = RoleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.0
    }
}

/// Failure to read a profile out of a `/auth/profile` payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("profile payload invalid: {message}")]
pub struct ProfileDecodeError {
    message: String,
}

/// Identity of the signed-in user, produced by a successful bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    id: Option<String>,
    role: Role,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelopeDto {
    user: Option<ProfileUserDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUserDto {
    id: Option<String>,
    #[serde(rename = "_id")]
    object_id: Option<String>,
    role: Option<String>,
    name: Option<String>,
    full_name: Option<String>,
}

impl UserProfile {
    /// Build a profile directly.
    pub fn new(id: Option<String>, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            display_name: display_name.into(),
        }
    }

    /// Decode `{ "user": { "role", "name" | "fullName", "id" | "_id" } }`.
    ///
    /// The display name prefers `name`, then `fullName`, then the id.
    ///
    /// # Examples
    /// ```
    /// use bloodbank_console::domain::UserProfile;
    /// use serde_json::json;
    ///
    /// let profile = UserProfile::from_payload(json!({
    ///     "user": { "_id": "u1", "role": "Admin", "fullName": "Ada Admin" }
    /// }))
    /// .unwrap();
    /// assert_eq!(profile.display_name(), "Ada Admin");
    /// assert_eq!(profile.id(), Some("u1"));
    /// ```
    pub fn from_payload(payload: Value) -> Result<Self, ProfileDecodeError> {
        let envelope: ProfileEnvelopeDto =
            serde_json::from_value(payload).map_err(|error| ProfileDecodeError {
                message: error.to_string(),
            })?;
        let user = envelope.user.ok_or_else(|| ProfileDecodeError {
            message: "missing user object".to_owned(),
        })?;
        let role = user
            .role
            .and_then(|raw| Role::new(raw).ok())
            .ok_or_else(|| ProfileDecodeError {
                message: "missing user role".to_owned(),
            })?;
        let id = user.id.or(user.object_id);
        let display_name = user
            .name
            .or(user.full_name)
            .or_else(|| id.clone())
            .unwrap_or_default();
        Ok(Self {
            id,
            role,
            display_name,
        })
    }

    /// Backend identifier, when the payload carried one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Role granted to the user.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Name shown in the portal header.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for profile decoding and role matching.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("admin", "admin", true)]
    #[case("ADMIN", "admin", true)]
    #[case("Hospital", "hospital", true)]
    #[case("donor", "admin", false)]
    #[case("lab-admin", "admin", false)]
    fn role_matching_ignores_case(#[case] actual: &str, #[case] expected: &str, #[case] ok: bool) {
        let actual = Role::new(actual).expect("role");
        let expected = Role::new(expected).expect("role");
        assert_eq!(actual.matches(&expected), ok);
    }

    #[test]
    fn blank_roles_are_rejected() {
        assert_eq!(Role::new("  "), Err(RoleValidationError));
    }

    #[rstest]
    #[case(json!({ "user": { "id": "7", "role": "admin", "name": "Root" } }), "Root")]
    #[case(json!({ "user": { "id": "7", "role": "admin", "fullName": "Ada" } }), "Ada")]
    #[case(json!({ "user": { "id": "7", "role": "admin" } }), "7")]
    fn display_name_fallbacks(#[case] payload: Value, #[case] expected: &str) {
        let profile = UserProfile::from_payload(payload).expect("profile");
        assert_eq!(profile.display_name(), expected);
        assert_eq!(profile.id(), Some("7"));
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "user": null }))]
    #[case(json!({ "user": { "id": "7" } }))]
    #[case(json!({ "user": { "id": "7", "role": "  " } }))]
    #[case(json!("not an object"))]
    fn malformed_profiles_fail(#[case] payload: Value) {
        assert!(UserProfile::from_payload(payload).is_err());
    }
}
