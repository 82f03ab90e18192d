//! URL handling module
//!
//! Canonicalization of raw link strings, host/authority extraction, and the
//! host-whitelist scope policy that bounds the crawl.

mod domain;
mod normalize;
mod scope;

pub use domain::{extract_authority, extract_host};
pub use normalize::normalize;
pub use scope::ScopePolicy;
