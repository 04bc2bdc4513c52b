//! Refera API
//!
//! HTTP surface for the referral intake service: a multipart upload endpoint
//! that drives the intake pipeline, a referral lookup endpoint, and a health
//! check. Authentication is a Bearer JWT; an absent or invalid token flows
//! into the pipeline as an anonymous identity and is rejected there.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
