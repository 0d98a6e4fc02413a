//! Shared test utilities for jwtl.
//!
//! This crate provides:
//! - Proptest generators for consumers and issuer names
//! - Fixed RSA key pair fixtures so tests skip key generation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use generators::*;
