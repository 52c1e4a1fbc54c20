//! Unit and integration tests for pgsqlex
//!
//! This module organizes all tests for the NIF implementation into logical submodules
//! that correspond to the main library modules.

mod descriptor_tests;
