//! Candidate generation from user feedback.
//!
//! `CandidateAggregator` combines a user's positive feedback with
//! precomputed neighbor lists into ranked, per-category candidates. The
//! collaborator traits it depends on live in `ports`.

pub mod aggregator;
pub mod ports;
