//! Token storage adapters.

mod memory;
mod token_file;

pub use memory::MemoryTokenStorage;
pub use token_file::{FileTokenStorage, TOKEN_KEY};
