// src/watch/mod.rs

//! File watching and change dispatch.
//!
//! This module is responsible for:
//! - Keeping track of which matchers care about which directory
//!   ([`registry`]), seeded by the initial tree walk.
//! - Turning raw per-directory notifications into accepted changes
//!   ([`dispatcher`]).
//! - Wiring up a cross-platform filesystem watcher (`notify`), one
//!   subscription per matcher ([`watcher`], [`native`]).
//! - Tying all of the above into a watch session ([`session`]).
//!
//! It does **not** decide when changes are handed to the consumer; that is
//! the job of [`crate::batch`].

pub mod dispatcher;
pub mod event;
pub mod native;
pub mod path_utils;
pub mod registry;
pub mod session;
pub mod watcher;

pub use dispatcher::EventDispatcher;
pub use event::{DirNotification, RawEvent, RawEventKind};
pub use registry::{WalkOutcome, WatchRegistry};
pub use session::FolderWatcher;
pub use watcher::{Subscription, subscribe};
