//! Test helpers for controller unit tests
//!
//! In-memory implementations of the repository traits plus fixtures, so controllers can be
//! exercised without an HTTP server.

pub mod fixtures;
pub mod mock_repositories;

pub use fixtures::*;
pub use mock_repositories::{MockAccountRepository, MockMediaRepository, Operation};

use crate::{LibraryController, Notifier};
use std::sync::Arc;

/// A controller over a fresh mock repository with the given items already stored.
pub fn create_mock_library(
    items: Vec<medialib_core::models::MediaSummary>,
) -> (LibraryController, Arc<MockMediaRepository>) {
    let repo = Arc::new(MockMediaRepository::new());
    for item in items {
        repo.add_item(item);
    }
    let controller = LibraryController::new(repo.clone(), Notifier::new(), 50);
    (controller, repo)
}
