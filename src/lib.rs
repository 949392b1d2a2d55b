//! Ingestion, deduplication and profile scoring of PhD position postings.
//!
//! `phd-watch` fetches monitored pages one at a time, extracts candidate
//! postings from keyword-bearing links, filters them through a persisted
//! content-addressed seen-cache, and scores each survivor against a candidate
//! profile. Identity and scoring are deterministic: identical inputs always
//! produce identical outputs.

pub mod cache;
pub mod config;
pub mod extraction;
pub mod fetch;
pub mod matching;
pub mod posting;
pub mod tools;
pub mod tracking;
pub mod types;
