//! Umbrella crate for the workspace demos. Everything lives in
//! [`placesearch_core`]; this just re-exports it.

pub use placesearch_core::*;
