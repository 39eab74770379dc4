//! Integration tests for the cattle registry repository layer:
//! tenant-scoped tag uniqueness, tombstone deletion, and list scoping.

use sqlx::PgPool;
use herdbook_core::breeding::CattleStatus;
use herdbook_core::types::DbId;
use herdbook_db::models::cattle::{CattleFilter, CreateCattle};
use herdbook_db::repositories::CattleRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_org(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO organizations (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seed organization")
}

async fn seed_user(pool: &PgPool, org: DbId, username: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role, organization_id) \
         VALUES ($1, $2, 'x', 'USER', $3) RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(org)
    .fetch_one(pool)
    .await
    .expect("seed user")
}

fn new_cattle(tag: &str) -> CreateCattle {
    CreateCattle {
        tag_number: tag.to_string(),
        name: format!("cow-{tag}"),
        breed: "Holstein".to_string(),
        gender: "FEMALE".to_string(),
        date_of_birth: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date"),
        parent_id: None,
        assigned_user_id: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn tag_is_unique_per_organization(pool: PgPool) {
    let org_a = seed_org(&pool, "farm-a").await;
    let org_b = seed_org(&pool, "farm-b").await;

    CattleRepo::create(&pool, org_a, &new_cattle("T-100"))
        .await
        .expect("first use of the tag");

    // Same tag in another organization is fine.
    CattleRepo::create(&pool, org_b, &new_cattle("T-100"))
        .await
        .expect("same tag in a different organization");

    // Same tag in the same organization violates the unique constraint.
    let err = CattleRepo::create(&pool, org_a, &new_cattle("T-100"))
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_cattle_tag_org"));
        }
        other => panic!("expected a database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn deletion_is_a_tombstone(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;
    let cow = CattleRepo::create(&pool, org, &new_cattle("T-100"))
        .await
        .unwrap();

    let marked = CattleRepo::mark_deceased(&pool, cow.id).await.unwrap();
    assert!(marked);

    // The row survives with the tombstone status; lineage stays resolvable.
    let found = CattleRepo::find_by_id(&pool, cow.id)
        .await
        .unwrap()
        .expect("tombstoned row still present");
    assert_eq!(found.status, CattleStatus::Deceased.as_str());
}

#[sqlx::test(migrations = "./migrations")]
async fn listing_is_scoped_by_organization_and_assignment(pool: PgPool) {
    let org_a = seed_org(&pool, "farm-a").await;
    let org_b = seed_org(&pool, "farm-b").await;
    let hand = seed_user(&pool, org_a, "hand").await;

    let mut assigned = new_cattle("T-100");
    assigned.assigned_user_id = Some(hand);
    CattleRepo::create(&pool, org_a, &assigned).await.unwrap();
    CattleRepo::create(&pool, org_a, &new_cattle("T-101")).await.unwrap();
    CattleRepo::create(&pool, org_b, &new_cattle("T-200")).await.unwrap();

    // Admin view: everything in the organization, nothing across tenants.
    let all = CattleRepo::list(&pool, org_a, &CattleFilter::default(), 50, 0)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    // User view: only assigned cattle.
    let filter = CattleFilter {
        assigned_user_id: Some(hand),
        ..Default::default()
    };
    let mine = CattleRepo::list(&pool, org_a, &filter, 50, 0).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].tag_number, "T-100");
}

#[sqlx::test(migrations = "./migrations")]
async fn listing_filters_by_status_and_search(pool: PgPool) {
    let org = seed_org(&pool, "farm-a").await;

    let cow = CattleRepo::create(&pool, org, &new_cattle("T-100")).await.unwrap();
    CattleRepo::create(&pool, org, &new_cattle("T-101")).await.unwrap();
    CattleRepo::update_status(&pool, cow.id, CattleStatus::Pregnant)
        .await
        .unwrap();

    let filter = CattleFilter {
        status: Some("PREGNANT".to_string()),
        ..Default::default()
    };
    let pregnant = CattleRepo::list(&pool, org, &filter, 50, 0).await.unwrap();
    assert_eq!(pregnant.len(), 1);
    assert_eq!(pregnant[0].id, cow.id);

    let filter = CattleFilter {
        search: Some("t-101".to_string()),
        ..Default::default()
    };
    let found = CattleRepo::list(&pool, org, &filter, 50, 0).await.unwrap();
    assert_eq!(found.len(), 1, "search is case-insensitive over the tag");
    assert_eq!(found[0].tag_number, "T-101");

    assert_eq!(
        CattleRepo::count(&pool, org, &CattleFilter::default())
            .await
            .unwrap(),
        2
    );
}
