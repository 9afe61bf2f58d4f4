//! Integration tests for rpc-conform
//!
//! These tests run whole scripts and check the result stream.

pub mod engine_tests;
pub mod http_client_tests;
