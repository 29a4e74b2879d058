//! Integration tests for the loupe workspace.
//!
//! These tests drive the full session surface the way an embedding host
//! does: parameters, prepare, store, extract, release.
