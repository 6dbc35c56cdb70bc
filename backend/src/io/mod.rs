//! # IO Module
//!
//! The interface layer between HTTP clients and the domain services. The
//! kiosk and admin frontends talk to the REST endpoints in [`rest`].

pub mod rest;

pub use rest::*;
