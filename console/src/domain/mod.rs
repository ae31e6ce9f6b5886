//! Domain primitives, services, and ports.
//!
//! Purpose: keep the console's behaviour (session bootstrap, querying, admin
//! actions) free of transport and storage concerns. Adapters live under
//! `crate::outbound`.

pub mod admin_api;
pub mod bootstrap;
pub mod credential;
pub mod error;
pub mod list_view;
pub mod ports;
pub mod profile;
pub mod query;
pub mod records;
pub mod session;

pub use self::admin_api::AdminApi;
pub use self::credential::{Credential, CredentialValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::profile::{ADMIN_ROLE, ProfileDecodeError, Role, RoleValidationError, UserProfile};
pub use self::session::{CredentialStore, SessionContext};
