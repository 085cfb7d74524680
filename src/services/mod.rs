//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own prompting, validation, image handling and history
//! persistence so route handlers stay focused on HTTP translation.

pub mod history;
pub mod image;
pub mod listing;
pub mod negotiation;
pub mod pricing;
