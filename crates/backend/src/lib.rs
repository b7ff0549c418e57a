//! Backend client for earthie-hub.
//!
//! This crate is the seam between the feature services and the managed
//! backend. Object storage, auth sessions, and the post row store sit behind
//! the [`BackendClient`] trait, with an HTTP implementation ([`RestBackend`])
//! for real deployments and an in-memory fake ([`MemoryBackend`]) for tests
//! and offline development.

pub mod client;
pub mod memory;
pub mod records;
pub mod rest;
pub mod session;

pub use client::{BackendClient, SharedBackend};
pub use memory::MemoryBackend;
pub use records::{
    CommentAggregate, NewPostRecord, PostRecord, PostType, ProfileRecord, ReactionRecord,
};
pub use rest::RestBackend;
pub use session::{Session, SessionUser, UserProfile};
