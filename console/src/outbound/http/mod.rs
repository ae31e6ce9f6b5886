//! HTTP adapter for the backend API.

mod reqwest_fetcher;

pub use reqwest_fetcher::{HttpIdentity, ReqwestResourceFetcher};
