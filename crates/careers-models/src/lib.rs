//! Shared data models for the career board backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job postings and applications as stored in the document database
//! - Applications enriched with fields from their job posting
//! - Write acknowledgments returned by the HTTP API

pub mod ack;
pub mod application;
pub mod id;
pub mod job_posting;

pub use ack::{InsertAck, UpdateAck};
pub use application::{Application, EnrichedApplication, StatusUpdate};
pub use id::DocumentId;
pub use job_posting::JobPosting;
