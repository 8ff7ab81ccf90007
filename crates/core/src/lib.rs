#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod callback;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod frontmatter;
pub mod host;
pub mod index;
pub mod markdown;
pub mod outcome;
pub mod params;
pub mod periodic;
pub mod routes;
pub mod search;
pub mod targeting;
pub mod template;
pub mod uri;
pub mod vault;

/// Brand tag prepended to every locally shown notice so the user can tell
/// which sender produced it.
pub const BRAND: &str = "[mduri]";

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
