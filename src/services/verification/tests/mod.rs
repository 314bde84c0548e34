//! Tests for the verification flow


mod session_tests;
