//! HTTP request handlers.

pub mod entries;
pub mod index;
