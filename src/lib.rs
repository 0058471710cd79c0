//! giyo - brochure and service catalog backend
//!
//! Marketing items (brochures and services) move through a role-gated
//! lifecycle. Every privileged action lands in an append-only audit trail,
//! and every item carries a generated code, slug and WhatsApp CTA link.

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod observability;
pub mod uploads;
