//! # Vibe Testing
//!
//! Testing utilities for the Vibe services.
//!
//! This crate provides:
//! - [`InMemoryStore`]: every repository trait over one mutex-guarded map set
//! - [`mocks`]: fixed clock and recording/failing notifiers
//! - [`fixtures`]: domain values and a fully wired [`TestServices`] bundle
//! - [`strategies`]: proptest generators for capacities and ticket requests
//!
//! ## Example
//!
//! ```
//! use vibe_testing::TestServices;
//!
//! # async fn example() -> vibe_core::Result<()> {
//! let services = TestServices::new();
//! let (_business, event) = services.seed_event(10);
//! let user = services.seed_user("Ada");
//!
//! let booked = services.reservations.create(event.id, user.id, 2).await?;
//! assert_eq!(booked.event.spots_left, 8);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod mocks;
pub mod store;
pub mod strategies;

pub use fixtures::{TEST_BCRYPT_COST, TestServices};
pub use mocks::{FailingNotifier, FixedClock, RecordingNotifier, test_clock};
pub use store::InMemoryStore;

/// Install a test-writer tracing subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
