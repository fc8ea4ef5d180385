//! End-to-end tests for Eddy
//!
//! These tests bind a real listener, run the production state (persistent
//! metadata table, flake identifiers) and talk to it over HTTP.

mod upload_workflow;
