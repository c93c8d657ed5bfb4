//! Quality gate for country trivia corpora.
//!
//! Candidate records flow through the validator (pattern + relevance
//! rules), the duplicate detector and the auditor; the remediation
//! orchestrator deletes or fixes what fails; the selection engine serves
//! quiz rounds from the clean pool with anti-repetition.

pub mod config;
pub mod model;
pub mod output;
pub mod quality;
pub mod remediation;
pub mod selection;
pub mod store;
