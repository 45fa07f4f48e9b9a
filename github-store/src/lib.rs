mod auth;
mod client;
mod contents_url;
pub mod domain;

pub(crate) use contents_url::*;

pub use auth::*;
pub use client::*;
pub use domain::*;
