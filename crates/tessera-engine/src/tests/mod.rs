//! Tests for the tessera-engine crate.

mod helpers;

mod basic;
