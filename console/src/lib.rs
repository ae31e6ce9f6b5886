//! Blood-bank management console core.
//!
//! The crate covers the two parts of the admin portals with real behaviour:
//! authenticated session bootstrap (credential, profile validation, retry and
//! role gate) and the in-memory query engine shared by every admin list view.
//! The `bloodbank-console` binary is a thin command-line front end over them.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;
