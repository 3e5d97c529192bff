use database_layer::{
    impl_entity, DynamicQuery, Entity, FilterCriterion, FilterOperator, InMemoryRepository,
    QueryParams, Repository,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Bed {
    id: Uuid,
    ward: String,
    occupied: bool,
    priority: i64,
}

impl_entity!(Bed, table = "beds", fields = [
    id: Uuid,
    ward: Text [searchable],
    occupied: Bool,
    priority: Int,
]);

const WARDS: [&str; 4] = ["Cardiology", "Oncology", "Pediatrics", "Maternity"];

fn arb_bed() -> impl Strategy<Value = Bed> {
    (0..WARDS.len(), any::<bool>(), -5i64..5).prop_map(|(ward, occupied, priority)| Bed {
        id: Uuid::new_v4(),
        ward: WARDS.get(ward).copied().unwrap_or_default().to_string(),
        occupied,
        priority,
    })
}

fn arb_filter() -> impl Strategy<Value = Option<FilterCriterion>> {
    prop_oneof![
        Just(None),
        any::<bool>().prop_map(|b| Some(FilterCriterion::new(
            "Occupied",
            FilterOperator::Equal,
            b.to_string()
        ))),
        (-5i64..5).prop_map(|p| Some(FilterCriterion::new(
            "priority",
            FilterOperator::GreaterThanOrEqual,
            p.to_string()
        ))),
    ]
}

fn run_query(beds: &[Bed], params: &QueryParams) -> Vec<Bed> {
    let query: DynamicQuery<Bed> = params.compile(100).unwrap();
    query.apply(beds.iter().cloned())
}

proptest! {
    #[test]
    fn page_never_exceeds_page_size(
        beds in prop::collection::vec(arb_bed(), 0..40),
        page_number in 1i64..6,
        page_size in 1i64..15,
        filter in arb_filter(),
    ) {
        let mut params = QueryParams::new(page_number, page_size);
        if let Some(filter) = filter {
            params = params.with_filter(filter);
        }
        let page = run_query(&beds, &params);
        prop_assert!(page.len() as i64 <= page_size);
    }

    #[test]
    fn page_is_slice_of_unpaged_result(
        beds in prop::collection::vec(arb_bed(), 0..40),
        page_number in 1i64..6,
        page_size in 1i64..15,
        descending in any::<bool>(),
    ) {
        let order = if descending { "desc" } else { "asc" };
        let all = run_query(&beds, &QueryParams::new(1, 100).with_sort("priority", order));
        let page = run_query(
            &beds,
            &QueryParams::new(page_number, page_size).with_sort("priority", order),
        );

        let skip = ((page_number - 1) * page_size) as usize;
        let expected: Vec<Bed> = all.into_iter().skip(skip).take(page_size as usize).collect();
        prop_assert_eq!(page, expected);
    }

    #[test]
    fn filtered_rows_all_match(
        beds in prop::collection::vec(arb_bed(), 0..40),
        occupied in any::<bool>(),
    ) {
        let params = QueryParams::new(1, 100).with_filter(FilterCriterion::new(
            "occupied",
            FilterOperator::Equal,
            occupied.to_string(),
        ));
        let result = run_query(&beds, &params);
        prop_assert!(result.iter().all(|bed| bed.occupied == occupied));
        prop_assert_eq!(
            result.len(),
            beds.iter().filter(|bed| bed.occupied == occupied).count()
        );
    }

    #[test]
    fn sorted_results_are_ordered(
        beds in prop::collection::vec(arb_bed(), 0..40),
        descending in any::<bool>(),
    ) {
        let order = if descending { "desc" } else { "asc" };
        let result = run_query(&beds, &QueryParams::new(1, 100).with_sort("Priority", order));
        for pair in result.windows(2) {
            if let [a, b] = pair {
                if descending {
                    prop_assert!(a.priority >= b.priority);
                } else {
                    prop_assert!(a.priority <= b.priority);
                }
            }
        }
    }

    #[test]
    fn invalid_page_size_always_rejected(page_size in -50i64..1, page_number in -5i64..5) {
        let err = QueryParams::new(page_number, page_size).compile::<Bed>(100).unwrap_err();
        prop_assert_eq!(err.to_string(), "Page size invalid!");
    }

    #[test]
    fn invalid_page_number_rejected_after_size(page_number in -50i64..1, page_size in 1i64..100) {
        let err = QueryParams::new(page_number, page_size).compile::<Bed>(100).unwrap_err();
        prop_assert_eq!(err.to_string(), "Page number invalid!");
    }
}

#[tokio::test]
async fn test_count_ignores_paging() {
    let repo = InMemoryRepository::new();
    for (ward, priority) in [("Cardiology", 1), ("Cardiology", 2), ("Oncology", 3)] {
        repo.insert(Bed {
            id: Uuid::nil(),
            ward: ward.to_string(),
            occupied: false,
            priority,
        })
        .await
        .unwrap();
    }

    let query = QueryParams::new(1, 1)
        .with_search("  CARDIO ")
        .compile::<Bed>(100)
        .unwrap();
    assert_eq!(repo.find(&query).await.unwrap().len(), 1);
    assert_eq!(repo.count(&query).await.unwrap(), 2);
    assert_eq!(Bed::TABLE, "beds");
}
