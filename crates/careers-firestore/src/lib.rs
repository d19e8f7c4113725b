//! Firestore REST API client.
//!
//! This crate provides:
//! - A document client over the Firestore v1 REST API
//! - Lossless conversion between JSON documents and Firestore values
//! - Typed repositories for job postings and applications
//! - Service account authentication via gcp_auth, or a static token for the emulator

pub mod client;
pub mod error;
pub mod metrics;
pub mod repos;
pub mod token_cache;
pub mod types;


pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use repos::{ApplicationRepository, JobPostingRepository};
pub use token_cache::{AccessTokenSource, StaticToken, TokenCache};
pub use types::{Document, Value};
