//! Integration tests for the user, item and proposal repositories.
//!
//! Focus on the conditional writes: each one must succeed for exactly one
//! caller and report a miss (not an error) to everyone else.

use barter_core::pagination::PageRequest;
use barter_core::proposal::ProposalStatus;
use barter_db::models::item::{CreateItem, Item, ItemFilter, UpdateItem};
use barter_db::models::proposal::ProposalFilter;
use barter_db::models::user::{CreateUser, UpdateProfile};
use barter_db::repositories::{ItemRepo, ProposalRepo, UserRepo};
use sqlx::PgPool;

const ALICE: &str = "52998224725";
const BOB: &str = "11144477735";
const CAROL: &str = "12345678909";

async fn seed_user(pool: &PgPool, national_id: &str, name: &str) {
    UserRepo::create(
        pool,
        &CreateUser {
            national_id: national_id.to_string(),
            name: name.to_string(),
            email: format!("{}@Example.com", name.to_lowercase()),
            password_hash: "$argon2id$placeholder".to_string(),
            address: format!("{name} Street 1"),
        },
    )
    .await
    .expect("user creation should succeed");
}

async fn seed_item(pool: &PgPool, owner: &str, name: &str) -> Item {
    ItemRepo::create(
        pool,
        owner,
        &CreateItem {
            name: name.to_string(),
            description: format!("A well kept {name}"),
            category: Some("misc".to_string()),
            image_url: None,
        },
    )
    .await
    .expect("item creation should succeed")
}

fn all() -> ProposalFilter {
    ProposalFilter {
        status: None,
        limit: 20,
        offset: 0,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn emails_are_stored_and_matched_case_insensitively(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;

    let user = UserRepo::find_by_email(&pool, "ALICE@example.COM")
        .await
        .unwrap()
        .expect("lookup ignores case");
    assert_eq!(user.national_id, ALICE);
    assert_eq!(user.email, "alice@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;

    let err = UserRepo::create(
        &pool,
        &CreateUser {
            national_id: BOB.to_string(),
            name: "Impostor".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "x".to_string(),
            address: "Nowhere 1".to_string(),
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_applies_only_given_fields(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;

    let updated = UserRepo::update_profile(
        &pool,
        ALICE,
        &UpdateProfile {
            address: Some("Rua Nova 42".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("user exists");

    assert_eq!(updated.name, "Alice");
    assert_eq!(updated.address, "Rua Nova 42");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_summary_counts_items_and_proposals(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    let chair = seed_item(&pool, BOB, "Chair").await;

    let mut conn = pool.acquire().await.unwrap();
    ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap()
        .expect("inserted");
    drop(conn);

    let alice = UserRepo::profile_summary(&pool, ALICE).await.unwrap().unwrap();
    assert_eq!(alice.item_count, 1);
    assert_eq!(alice.sent_proposal_count, 1);
    assert_eq!(alice.received_proposal_count, 0);

    let bob = UserRepo::profile_summary(&pool, BOB).await.unwrap().unwrap();
    assert_eq!(bob.received_proposal_count, 1);
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_owned_ignores_non_owner(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;

    let patch = UpdateItem {
        name: Some("Stolen lamp".to_string()),
        ..Default::default()
    };
    let result = ItemRepo::update_owned(&pool, lamp.id, BOB, &patch).await.unwrap();
    assert!(result.is_none());

    let unchanged = ItemRepo::find_by_id(&pool, lamp.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, "Lamp");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_string_clears_optional_fields(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    assert_eq!(lamp.category.as_deref(), Some("misc"));

    let patch = UpdateItem {
        category: Some(String::new()),
        ..Default::default()
    };
    let updated = ItemRepo::update_owned(&pool, lamp.id, ALICE, &patch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.category, None);
    assert_eq!(updated.name, "Lamp");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_hides_inactive_and_escapes_wildcards(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    seed_item(&pool, ALICE, "Desk").await;
    seed_item(&pool, ALICE, "100% wool rug").await;

    ItemRepo::update_owned(
        &pool,
        lamp.id,
        ALICE,
        &UpdateItem {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let page = PageRequest::new(None, None);
    let (items, total) = ItemRepo::list_active(&pool, &ItemFilter::default(), page)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert!(items.iter().all(|l| l.item.name != "Lamp"));
    assert_eq!(items[0].owner_name, "Alice");

    let filter = ItemFilter {
        category: None,
        search: Some("%".to_string()),
    };
    let (items, total) = ItemRepo::list_active(&pool, &filter, page).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].item.name, "100% wool rug");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn referenced_item_cannot_be_deleted(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    let chair = seed_item(&pool, BOB, "Chair").await;
    let spare = seed_item(&pool, ALICE, "Spare").await;

    let mut conn = pool.acquire().await.unwrap();
    ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap()
        .unwrap();
    drop(conn);

    assert!(ItemRepo::is_referenced(&pool, lamp.id).await.unwrap());
    assert!(!ItemRepo::delete_owned(&pool, lamp.id, ALICE).await.unwrap());
    assert!(!ItemRepo::delete_owned(&pool, chair.id, BOB).await.unwrap());
    assert!(ItemRepo::delete_owned(&pool, spare.id, ALICE).await.unwrap());
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_pending_insert_for_same_triple_is_a_miss(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    let chair = seed_item(&pool, BOB, "Chair").await;

    let mut conn = pool.acquire().await.unwrap();
    let first = ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap();
    let second = ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap();

    let first = first.expect("first insert wins");
    assert_eq!(first.status, ProposalStatus::Pending);
    assert_eq!(first.item_owner_id, BOB);
    assert!(second.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn terminal_rows_do_not_block_a_new_pending_one(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    let chair = seed_item(&pool, BOB, "Chair").await;

    let mut conn = pool.acquire().await.unwrap();
    let first = ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap()
        .unwrap();
    ProposalRepo::transition(&pool, first.id, BOB, ProposalStatus::Rejected)
        .await
        .unwrap()
        .expect("owner may reject");

    let again = ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap();
    assert!(again.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn transition_is_compare_and_swap(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    let chair = seed_item(&pool, BOB, "Chair").await;

    let mut conn = pool.acquire().await.unwrap();
    let proposal = ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap()
        .unwrap();
    drop(conn);

    // The proposer is not the item owner.
    let by_proposer = ProposalRepo::transition(&pool, proposal.id, ALICE, ProposalStatus::Accepted)
        .await
        .unwrap();
    assert!(by_proposer.is_none());

    let accepted = ProposalRepo::transition(&pool, proposal.id, BOB, ProposalStatus::Accepted)
        .await
        .unwrap()
        .expect("first decision wins");
    assert_eq!(accepted.status, ProposalStatus::Accepted);

    let again = ProposalRepo::transition(&pool, proposal.id, BOB, ProposalStatus::Rejected)
        .await
        .unwrap();
    assert!(again.is_none(), "terminal proposals never change");

    let stored = ProposalRepo::find_by_id(&pool, proposal.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProposalStatus::Accepted);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_pending_only_for_proposer_and_pending(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    let chair = seed_item(&pool, BOB, "Chair").await;

    let mut conn = pool.acquire().await.unwrap();
    let proposal = ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap()
        .unwrap();
    drop(conn);

    assert!(!ProposalRepo::delete_pending(&pool, proposal.id, BOB).await.unwrap());
    assert!(ProposalRepo::delete_pending(&pool, proposal.id, ALICE).await.unwrap());
    assert!(ProposalRepo::find_by_id(&pool, proposal.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listings_show_the_other_party(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    seed_user(&pool, CAROL, "Carol").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    let chair = seed_item(&pool, BOB, "Chair").await;
    let vase = seed_item(&pool, CAROL, "Vase").await;

    let mut conn = pool.acquire().await.unwrap();
    ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap()
        .unwrap();
    let second = ProposalRepo::create_pending(&mut conn, lamp.id, vase.id, ALICE, CAROL)
        .await
        .unwrap()
        .unwrap();
    drop(conn);

    let sent = ProposalRepo::list_sent(&pool, ALICE, &all()).await.unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].proposal.id, second.id, "newest first");
    assert_eq!(sent[0].counterpart.national_id, CAROL);
    assert_eq!(sent[1].counterpart.national_id, BOB);
    assert_eq!(sent[0].offered_item.name, "Lamp");
    assert_eq!(sent[0].wanted_item.name, "Vase");

    let received = ProposalRepo::list_received(&pool, BOB, &all()).await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].counterpart.national_id, ALICE);
    assert_eq!(received[0].counterpart.name, "Alice");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_filters_by_status(pool: PgPool) {
    seed_user(&pool, ALICE, "Alice").await;
    seed_user(&pool, BOB, "Bob").await;
    let lamp = seed_item(&pool, ALICE, "Lamp").await;
    let chair = seed_item(&pool, BOB, "Chair").await;
    let desk = seed_item(&pool, BOB, "Desk").await;

    let mut conn = pool.acquire().await.unwrap();
    let first = ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap()
        .unwrap();
    ProposalRepo::create_pending(&mut conn, lamp.id, desk.id, ALICE, BOB)
        .await
        .unwrap()
        .unwrap();
    drop(conn);
    ProposalRepo::transition(&pool, first.id, BOB, ProposalStatus::Accepted)
        .await
        .unwrap()
        .unwrap();

    let filter = ProposalFilter {
        status: Some(ProposalStatus::Accepted),
        ..all()
    };
    let accepted = ProposalRepo::list_received(&pool, BOB, &filter).await.unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].proposal.id, first.id);
}
