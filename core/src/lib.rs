//! Corpus pipeline for access policies harvested from forum posts:
//! extraction, triage into categories, structural repair, quarantine,
//! and concurrent checking against an external satisfiability checker.

pub mod api;
pub mod checker;
pub mod config;
pub mod errors;
pub mod extract;
pub mod policy;
pub mod quarantine;
pub mod triage;
pub mod validate;
