//! Request validation must reject bad input before the repository is called.
//!
//! The repository is a mockall mock with `never()` expectations, so any
//! store access fails the test.
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use config_engine::QuerySettings;
use database_layer::{DatabaseResult, DynamicQuery, FilterCriterion, FilterOperator, QueryParams, Repository};
use emr_services::{Visit, VisitService};
use error_common::EmrError;
use mockall::{mock, predicate::eq};
use proptest::prelude::*;
use uuid::Uuid;

mock! {
    pub VisitRepo {}

    #[async_trait]
    impl Repository<Visit> for VisitRepo {
        async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Visit>>;
        async fn find(&self, query: &DynamicQuery<Visit>) -> DatabaseResult<Vec<Visit>>;
        async fn count(&self, query: &DynamicQuery<Visit>) -> DatabaseResult<u64>;
        async fn insert(&self, entity: Visit) -> DatabaseResult<Uuid>;
        async fn update(&self, id: Uuid, entity: Visit) -> DatabaseResult<bool>;
        async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;
    }
}

fn untouched_repo() -> MockVisitRepo {
    let mut repo = MockVisitRepo::new();
    repo.expect_find_by_id().never();
    repo.expect_find().never();
    repo.expect_count().never();
    repo.expect_insert().never();
    repo.expect_update().never();
    repo.expect_delete().never();
    repo
}

fn service(repo: MockVisitRepo) -> VisitService<MockVisitRepo> {
    VisitService::<MockVisitRepo>::new(repo, QuerySettings::default())
}

fn follow_up() -> Visit {
    Visit {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id: None,
        visit_date: Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap(),
        reason: "Follow-up".to_string(),
        diagnosis: None,
        status: "open".to_string(),
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn invalid_paging_issues_no_query(page_number in -20i64..20, page_size in -20i64..1) {
        let err = block_on(service(untouched_repo()).get(&QueryParams::new(page_number, page_size)))
            .unwrap_err();
        prop_assert_eq!(err.to_string(), "Page size invalid!");
    }

    #[test]
    fn invalid_page_number_issues_no_query(page_number in -20i64..1, page_size in 1i64..50) {
        let err = block_on(service(untouched_repo()).get_page(&QueryParams::new(page_number, page_size)))
            .unwrap_err();
        prop_assert_eq!(err.to_string(), "Page number invalid!");
    }

    #[test]
    fn unknown_sort_order_always_fails(order in "[a-z]{1,8}") {
        prop_assume!(order != "asc" && order != "desc");
        let params = QueryParams::new(1, 10).with_sort("visit_date", order);
        let err = block_on(service(untouched_repo()).get(&params)).unwrap_err();
        prop_assert_eq!(err.to_string(), "Invalid sort order. Use 'asc' or 'desc'");
    }
}

#[tokio::test]
async fn test_missing_patch_document_fails_before_store() {
    let err = service(untouched_repo())
        .patch(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert_eq!(err, EmrError::PatchMissing);
    assert_eq!(err.to_string(), "Patch document is missing!");
}

#[tokio::test]
async fn test_unknown_sort_field_fails_before_store() {
    let params = QueryParams::new(1, 10).with_sort("VisitDay", "asc");
    let err = service(untouched_repo()).get(&params).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid sort field: VisitDay");
}

#[tokio::test]
async fn test_invalid_filters_fail_before_store() {
    let svc = service(untouched_repo());

    let unknown = QueryParams::new(1, 10)
        .with_filter(FilterCriterion::new("ward", FilterOperator::Equal, "A"));
    assert_eq!(
        svc.get(&unknown).await.unwrap_err().to_string(),
        "Invalid filter property: ward"
    );

    let bad_value = QueryParams::new(1, 10)
        .with_filter(FilterCriterion::new("VisitDate", FilterOperator::GreaterThan, "yesterday"));
    assert_eq!(
        svc.get(&bad_value).await.unwrap_err().to_string(),
        "Invalid filter value for VisitDate: yesterday"
    );

    let text_op = QueryParams::new(1, 10)
        .with_filter(FilterCriterion::new("patient_id", FilterOperator::Contains, "abc"));
    assert_eq!(
        svc.get(&text_op).await.unwrap_err().to_string(),
        "Operator Contains is not supported for patient_id"
    );

    let err = svc
        .count(&[FilterCriterion::new("status", FilterOperator::Equal, "open"),
                 FilterCriterion::new("room", FilterOperator::Equal, "4")], None)
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_update_reports_missing_row() {
    let id = Uuid::new_v4();
    let mut repo = MockVisitRepo::new();
    repo.expect_update()
        .withf(move |row_id, visit| *row_id == id && visit.id == id)
        .times(1)
        .returning(|_, _| Ok(false));

    let err = service(repo).update(id, follow_up()).await.unwrap_err();
    assert_eq!(err.to_string(), "No data found!");
}

#[tokio::test]
async fn test_delete_reports_missing_row() {
    let id = Uuid::new_v4();
    let mut repo = MockVisitRepo::new();
    repo.expect_delete().with(eq(id)).times(1).returning(|_| Ok(false));

    let err = service(repo).delete(id).await.unwrap_err();
    assert_eq!(err, EmrError::NotFound);
}

#[tokio::test]
async fn test_patch_on_missing_id_never_writes() {
    let id = Uuid::new_v4();
    let mut repo = MockVisitRepo::new();
    repo.expect_find_by_id().with(eq(id)).times(1).returning(|_| Ok(None));
    repo.expect_update().never();

    let patch = database_layer::parse_patch(r#"[{"op":"replace","path":"/status","value":"closed"}]"#)
        .unwrap();
    let err = service(repo).patch(id, Some(&patch)).await.unwrap_err();
    assert_eq!(err.to_string(), "No data found!");
}

#[tokio::test]
async fn test_get_page_counts_without_paging() {
    let mut repo = MockVisitRepo::new();
    repo.expect_find()
        .withf(|query| query.page.map(|p| (p.number, p.size)) == Some((3, 2)))
        .times(1)
        .returning(|_| Ok(vec![follow_up()]));
    repo.expect_count()
        .withf(|query| query.page.is_none() && query.sort.is_none())
        .times(1)
        .returning(|_| Ok(5));

    let params = QueryParams::new(3, 2).with_sort("visit_date", "desc");
    let page = service(repo).get_page(&params).await.unwrap();
    assert_eq!(page.total_count, 5);
    assert_eq!(page.total_pages, 3);
    assert!(!page.has_next);
    assert!(page.has_previous);
    assert_eq!(page.items.len(), 1);
}
