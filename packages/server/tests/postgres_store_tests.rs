//! The same tree and filter code against real Postgres stores.
//!
//! Requires Docker. Run with: cargo test --test postgres_store_tests -- --ignored

mod common;

use crate::common::{resource, seed_located_resources, titles, PostgresHarness};
use directory_core::common::{DirectoryError, LocationId};
use directory_core::domains::locations::NewLocation;
use directory_core::domains::resources::{
    create_resource, resource_tags, update_resource, CreateResource, FilterCriteria, TagCategory,
    UpdateResource,
};
use test_context::test_context;

async fn resource_row_count(ctx: &PostgresHarness) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM resources")
        .fetch_one(&ctx.db_pool)
        .await
        .unwrap()
}

#[test_context(PostgresHarness)]
#[tokio::test]
#[ignore] // Requires Docker
async fn resolves_and_filters_by_location(ctx: &PostgresHarness) {
    let tree = ctx.deps.location_tree();
    tree.resolve("Seattle").await.unwrap();
    seed_located_resources(&ctx.deps).await.unwrap();

    assert_eq!(
        tree.ancestor_chain(Some("Seattle")).await.unwrap(),
        vec!["Seattle", "Washington", "USA", "Global"]
    );

    let filter = ctx.deps.resource_filter();
    let california = filter
        .location_helper(&FilterCriteria::new().with("location", "California"))
        .await
        .unwrap();
    let funding_in_usa = filter
        .filter(
            &FilterCriteria::new()
                .with("location", "USA")
                .with("types", "Funding,Events"),
        )
        .await
        .unwrap();

    assert_eq!(titles(&california), vec!["thing2", "thing4"]);
    assert_eq!(titles(&funding_in_usa), vec!["thing2", "thing3", "thing4", "thing5"]);
}

#[test_context(PostgresHarness)]
#[tokio::test]
#[ignore] // Requires Docker
async fn categories_intersect_in_sql(ctx: &PostgresHarness) {
    for (title, types, audiences) in [
        ("r1", "Scholarship", "Faculty"),
        ("r2", "Funding", "Alumni"),
        ("r3", "Scholarship,Funding", "Staff"),
        ("r4", "Mentoring", "Faculty"),
    ] {
        create_resource(resource(title, "Global", types, audiences), &ctx.deps)
            .await
            .unwrap();
    }

    let criteria = FilterCriteria::new()
        .with("types", "Scholarship,Funding")
        .with("audiences", "Faculty,Staff")
        .with("approval_status", "0");
    let found = ctx.deps.resource_filter().filter(&criteria).await.unwrap();

    assert_eq!(titles(&found), vec!["r1", "r3"]);
}

#[test_context(PostgresHarness)]
#[tokio::test]
#[ignore] // Requires Docker
async fn duplicate_names_and_second_roots_are_rejected(ctx: &PostgresHarness) {
    let tree = ctx.deps.location_tree();
    tree.insert_seed().await.unwrap();
    let usa = ctx
        .deps
        .location_store
        .find_by_name("USA")
        .await
        .unwrap()
        .unwrap();

    let duplicate = ctx
        .deps
        .location_store
        .insert(NewLocation::child_of("California", &usa))
        .await
        .unwrap_err();
    let orphan = ctx
        .deps
        .location_store
        .insert(NewLocation {
            id: LocationId::new(),
            name: "Nowhere".to_string(),
            parent_id: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(duplicate, DirectoryError::DuplicateLocation(name) if name == "California"));
    assert!(matches!(orphan, DirectoryError::MissingParent(_)));
    assert!(matches!(
        tree.insert_seed().await.unwrap_err(),
        DirectoryError::RootAlreadyExists
    ));
}

#[test_context(PostgresHarness)]
#[tokio::test]
#[ignore] // Requires Docker
async fn failed_tag_insert_rolls_back_the_resource(ctx: &PostgresHarness) {
    // Straight to the store, skipping validation, so the column limit trips mid-transaction
    let input = CreateResource {
        audiences: vec!["x".repeat(300)],
        ..resource("doomed", "Global", "Funding", "Grad")
    };

    let result = ctx.deps.resource_store.create_with_categories(input).await;

    assert!(result.is_err());
    assert_eq!(resource_row_count(ctx).await, 0);
    assert_eq!(
        ctx.deps
            .resource_filter()
            .tag_count(TagCategory::Types, "Funding")
            .await
            .unwrap(),
        0
    );
}

#[test_context(PostgresHarness)]
#[tokio::test]
#[ignore] // Requires Docker
async fn update_replaces_tags_and_keeps_order(ctx: &PostgresHarness) {
    let created = create_resource(resource("thing", "Global", "Funding,Events", "Grad"), &ctx.deps)
        .await
        .unwrap();

    let updated = update_resource(
        created.id,
        UpdateResource {
            flagged: Some(1),
            types: Some(vec!["Networking".to_string(), "Mentoring".to_string()]),
            ..Default::default()
        },
        &ctx.deps,
    )
    .await
    .unwrap();

    assert_eq!(updated.flagged, 1);
    assert_eq!(updated.title, "thing");
    assert_eq!(
        resource_tags(created.id, TagCategory::Types, &ctx.deps).await.unwrap(),
        vec!["Networking", "Mentoring"]
    );
    assert_eq!(
        resource_tags(created.id, TagCategory::Audiences, &ctx.deps).await.unwrap(),
        vec!["Grad"]
    );

    let flagged = ctx
        .deps
        .resource_filter()
        .filter(&FilterCriteria::new().with("flagged", 1_i64))
        .await
        .unwrap();
    assert_eq!(titles(&flagged), vec!["thing"]);
}
