//! Transit board server for Île-de-France public transport.
//!
//! Normalizes the many identifier encodings used by the PRIM API, validates
//! and projects its responses into a small set of domain types, and serves
//! them as JSON: next passages, line status, screen messages, search and
//! line stops.

pub mod cache;
pub mod domain;
pub mod prim;
pub mod web;
