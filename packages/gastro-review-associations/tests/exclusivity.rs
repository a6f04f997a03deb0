use gastro_review_associations::{types::*, AssociationManager, MemoryStore};
use proptest::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Create { target: i64, exclusive: bool },
    Update { target: i64, exclusive: Option<bool> },
    Delete { target: i64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..5_i64, any::<bool>()).prop_map(|(target, exclusive)| Op::Create { target, exclusive }),
        (0..5_i64, proptest::option::of(any::<bool>()))
            .prop_map(|(target, exclusive)| Op::Update { target, exclusive }),
        (0..5_i64).prop_map(|target| Op::Delete { target }),
    ]
}

proptest! {
    #[test]
    fn at_most_one_exclusive_branch_per_restaurant(ops in proptest::collection::vec(op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let restaurant = Uuid::from_u128(7);
        let other = Uuid::from_u128(8);
        let mut store = MemoryStore::<RestaurantAddress>::new()
            .with_owner(restaurant)
            .with_owner(other);
        for target in 0..5 {
            store.add_target(target);
        }
        let mut manager = AssociationManager::new(store);

        runtime.block_on(async {
            // A primary branch of another restaurant must never be touched.
            manager
                .create(AssociationRequest::new(other, 0).exclusive(true))
                .await
                .unwrap();

            for op in ops {
                let result = match op {
                    Op::Create { target, exclusive } => manager
                        .create(AssociationRequest::new(restaurant, target).exclusive(exclusive))
                        .await
                        .map(|_| ()),
                    Op::Update { target, exclusive } => {
                        let request = AssociationRequest {
                            exclusive,
                            ..AssociationRequest::default()
                        };
                        manager.update(restaurant, target, request).await.map(|_| ())
                    }
                    Op::Delete { target } => manager.delete(restaurant, target).await,
                };

                if let Err(e) = result {
                    assert!(e.is_client_error(), "unexpected failure: {e}");
                }

                assert!(manager.store().exclusive_count(&restaurant) <= 1);
                assert_eq!(manager.store().exclusive_count(&other), 1);
                assert!(!manager.store().in_transaction());
            }
        });
    }
}
