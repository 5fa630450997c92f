//! Core domain types for the coinpress platform.
//!
//! This crate holds the types shared by every other coinpress crate:
//! supporter badges and their tiers, creator-coin holding records, and the
//! content records (posts, comments) the HTTP surface serves. It carries no
//! I/O; storage backends and the badge resolver live in their own crates.

pub mod badge;
pub mod content;
pub mod holding;
pub mod id;

pub use badge::{Badge, BadgeTier, ParseTierError};
pub use content::{Comment, CommentAuthor, PostSummary};
pub use holding::HoldingRecord;
pub use id::generate_id;
