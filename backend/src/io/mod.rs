//! # IO Module
//!
//! HTTP surface over the domain services. Handlers only translate requests
//! into domain calls and domain errors into status codes.

pub mod rest;

pub use rest::*;
