//! placesearch-cli
//! ===============
//!
//! Command-line interface for the `placesearch-core` search controller.
//!
//! This crate primarily provides a binary (`placesearch`). The library target
//! holds the line-oriented front end used by `placesearch interactive`, so it
//! can be tested without a terminal.
//!
//! Quick start
//! -----------
//!
//! ```text
//! export PLACESEARCH_API_KEY=...
//! placesearch resolve "Côte d'Ivoire"
//! placesearch fetch France --page 2 --size 10
//! placesearch interactive
//! ```
//!
//! For programmatic access, use [`placesearch-core`] directly.

pub mod repl;
