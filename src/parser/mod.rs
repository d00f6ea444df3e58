//! Page-level text processing: search-result links, readable article text,
//! and the named-entity candidates inside it.

pub mod chunker;
pub mod entities;
pub mod links;
pub mod scrub;
pub mod tagger;
pub mod tokens;
