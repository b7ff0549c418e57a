//! Core business logic for earthie-hub.
//!
//! Two features live here. The lobbyist post flow: [`PostComposer`] holds
//! the dialog's draft and delegates to [`UploadService`] (sequential image
//! upload into the post bucket) and [`PostService`] (validation, session
//! resolution, row insert, and mapping into the UI-facing [`LobbyPost`]).
//! And the property map: [`MapPreview`] renders one location through a
//! static-image tile provider with an explicit display state machine.

pub mod services;

pub use services::*;
