//! Integration tests for Eddy
//!
//! These tests drive the full router in-process with an in-memory catalog and
//! a temporary videos directory. They cover the upload and retrieval contract,
//! range framing, the listing page and the static fallback.

#[path = "integration/harness.rs"]
mod harness;

#[path = "integration/upload_retrieval.rs"]
mod upload_retrieval;

#[path = "integration/range_requests.rs"]
mod range_requests;

#[path = "integration/listing_and_assets.rs"]
mod listing_and_assets;

#[path = "integration/store_failures.rs"]
mod store_failures;
