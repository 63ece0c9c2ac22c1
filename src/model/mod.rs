//! Core data model types for dispatch emails, work-order drafts, and status updates.

pub mod email;
pub mod status;
pub mod work_order;
