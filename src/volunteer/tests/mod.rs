//! Unit tests for the volunteer module.
