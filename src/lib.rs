//! Bag Reconstruct: rebuilds documents from grammar templates while
//! preserving their word bags.
//!
//! Each document is reduced to a multiset of words, the words are tagged
//! and pooled by grammatical category, template sentences are generated
//! from the pools, and a greedy cover picks the sentences whose combined
//! words fit inside the original bag.

pub mod core;
pub mod schema;
pub mod table;
