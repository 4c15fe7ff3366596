//! Runtime of the recommendli dashboard: resource stores, the fetch
//! executor, visibility-gated polling and the composition that ties them to
//! the recommendations API.

pub mod auth;
pub mod dashboard;
pub mod executor;
pub mod fetch_state;
pub mod notify;
pub mod polling;
pub mod resource;
pub mod visibility;
