//! Property: spots left always equals capacity minus the tickets of the
//! reservations that were accepted, and never underflows.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use vibe_core::{EventRepository, VibeError};
use vibe_testing::TestServices;
use vibe_testing::strategies::{capacity, capacity_policy, ticket_requests};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn spots_left_tracks_accepted_tickets(
        total in capacity(),
        policy in capacity_policy(),
        requests in ticket_requests(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let services = TestServices::with_policy(policy);
            let (_business, event) = services.seed_event(total);
            let mut accepted = 0u32;

            for tickets in requests {
                let before = services.store.get_event(event.id).await.unwrap().unwrap().spots_left;
                let user = services.seed_user("Guest");
                match services.reservations.create(event.id, user.id, tickets).await {
                    Ok(details) => {
                        prop_assert!(policy.admits(before, tickets));
                        accepted += tickets;
                        prop_assert_eq!(details.event.spots_left, total - accepted);
                    }
                    Err(VibeError::Conflict(_)) => {
                        prop_assert!(!policy.admits(before, tickets));
                    }
                    Err(other) => prop_assert!(false, "unexpected error {other:?}"),
                }
            }

            let stored = services.store.get_event(event.id).await.unwrap().unwrap();
            prop_assert_eq!(stored.spots_left, total - accepted);
            prop_assert!(stored.spots_left <= stored.capacity);
            Ok(())
        })?;
    }
}
