//! Theme taxonomy
//!
//! Static, process-wide tables shared by the seeders: the theme pools that
//! model a travel persona, and the tag vocabulary trips are labelled with.
//! Nothing here is mutable at runtime.

pub mod pools;
pub mod tags;

pub use pools::{find_matching_pool, ThemePool, THEME_POOLS};
pub use tags::{search_tags, PredefinedTag, PREDEFINED_TAGS};
