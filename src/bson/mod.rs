//! BSON utilities for document labelling.

mod key;

pub use key::*;
