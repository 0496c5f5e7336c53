//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and persistence so route handlers can
//! stay focused on request parsing and status mapping.

pub mod activity;
pub mod leads;
pub mod market;
pub mod sessions;
pub mod signups;
