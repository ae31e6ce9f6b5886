//! Domain ports implemented by outbound adapters.

mod macros;
mod resource_fetcher;
mod token_storage;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use token_storage::MockTokenStorage;
pub use resource_fetcher::{FetchError, FetchRequest, HttpMethod, Payload, ResourceFetcher};
pub use token_storage::{TokenStorage, TokenStorageError};
