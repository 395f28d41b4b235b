//! Client-side state for the media library.
//!
//! - [`LibraryController`] owns the working set of media items and mediates every
//!   list/search/upload/edit/delete call, reporting outcomes through a [`Notifier`].
//! - [`PlaybackSession`] manages quality switching for one open video. Responses to
//!   superseded switch requests are discarded by token, never applied by arrival order.
//! - [`SessionProvider`] wraps the shared [`medialib_core::Session`] with login, logout,
//!   registration and profile operations.

pub mod account;
pub mod library;
pub mod notifier;
pub mod playback;
pub mod telemetry;

#[cfg(test)]
pub mod test_helpers;

pub use account::SessionProvider;
pub use library::{LibraryController, LibraryStats, OpenItem};
pub use notifier::Notifier;
pub use playback::{PlaybackPhase, PlaybackSession, PlaybackState, SwitchOutcome, SwitchTicket};
pub use telemetry::init_tracing;
