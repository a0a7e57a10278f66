//! Integration tests - catalog loading, configuration and end-to-end compilation
//!
//! These tests drive the public API the way an embedding application would:
//! YAML files on disk, JSON ASTs, and the `compile` entry point.

mod catalog_config_tests;
mod compile_tests;
