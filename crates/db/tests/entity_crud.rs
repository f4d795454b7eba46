//! Integration tests for the repository layer against a real database:
//! - Places, users and their constraints
//! - Instance creation, relocation and loans
//! - Catalog deletion rules (images cascade, instances restrict)
//! - Aggregate stats

use pomucky_core::instance::{LoanChange, Renter};
use pomucky_core::place::Contact;
use pomucky_core::roles::Role;
use pomucky_db::models::image::CreateImage;
use pomucky_db::models::instance::{CreateInstance, UpdateInstance};
use pomucky_db::models::place::{CreatePlace, UpdatePlace};
use pomucky_db::models::pomucka::{CreatePomucka, PomuckaDetails, UpdatePomucka};
use pomucky_db::models::user::CreateUser;
use pomucky_db::repositories::{
    ImageRepo, InstanceRepo, PlaceRepo, PomuckaRepo, StatsRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_place(name: &str) -> CreatePlace {
    CreatePlace {
        name: name.to_string(),
        description: String::new(),
        website: String::new(),
        contacts: Vec::new(),
    }
}

fn new_user(name: &str, place_id: i64) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        display_name: String::new(),
        password_hash: "hash".to_string(),
        role: Role::LocalManager,
        place_id,
        force_change_password: true,
    }
}

fn new_pomucka(name: &str) -> CreatePomucka {
    CreatePomucka {
        name: name.to_string(),
        signatura: "S-1".to_string(),
        isxn: Some(9788072353359),
        categories: vec!["hmat".to_string()],
        details: PomuckaDetails {
            author: Some("Novák".to_string()),
            year: Some(1995),
            ..Default::default()
        },
    }
}

fn renter() -> Renter {
    Renter {
        name: "Jan Novák".to_string(),
        identifier: "ZS-1".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Places and users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_place_partial_update_and_banner(pool: PgPool) {
    let mut input = new_place("Tyflocentrum");
    input.contacts = vec![Contact {
        email: "a@b.cz".into(),
        phone: None,
        name: "Recepce".into(),
        description: "Výpůjčky".into(),
    }];
    let place = PlaceRepo::create(&pool, &input).await.unwrap();
    assert_eq!(place.contacts.0.len(), 1);
    assert!(!place.has_banner);

    let update = UpdatePlace {
        website: Some("https://example.cz".into()),
        ..Default::default()
    };
    let updated = PlaceRepo::update(&pool, place.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.name, "Tyflocentrum");
    assert_eq!(updated.website, "https://example.cz");
    assert_eq!(updated.contacts.0.len(), 1, "absent contacts keep the list");

    assert!(PlaceRepo::find_banner(&pool, place.id).await.unwrap().is_none());
    assert!(PlaceRepo::set_banner(&pool, place.id, b"png", "image/png").await.unwrap());
    let banner = PlaceRepo::find_banner(&pool, place.id).await.unwrap().unwrap();
    assert_eq!(banner.banner, b"png");
    assert!(PlaceRepo::find_by_id(&pool, place.id).await.unwrap().unwrap().has_banner);

    assert!(PlaceRepo::update(&pool, 999_999, &update).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_name_unique(pool: PgPool) {
    let place = PlaceRepo::create(&pool, &new_place("A")).await.unwrap();
    UserRepo::create(&pool, &new_user("a@b.cz", place.id)).await.unwrap();

    let err = UserRepo::create(&pool, &new_user("a@b.cz", place.id))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_users_name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_password_update_clears_force_flag(pool: PgPool) {
    let place = PlaceRepo::create(&pool, &new_place("A")).await.unwrap();
    let user = UserRepo::create(&pool, &new_user("a@b.cz", place.id)).await.unwrap();
    assert!(user.force_change_password);
    assert_eq!(user.role(), Some(Role::LocalManager));

    assert!(UserRepo::update_password(&pool, user.id, "new").await.unwrap());
    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(!user.force_change_password);
    assert_eq!(user.password_hash, "new");

    let other = PlaceRepo::create(&pool, &new_place("B")).await.unwrap();
    UserRepo::create(&pool, &new_user("c@d.cz", other.id)).await.unwrap();
    assert_eq!(UserRepo::list_by_place(&pool, place.id).await.unwrap().len(), 1);
    assert_eq!(UserRepo::list(&pool).await.unwrap().len(), 2);

    assert!(UserRepo::delete(&pool, user.id).await.unwrap());
    assert!(!UserRepo::delete(&pool, user.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_instance_relocation_and_loan(pool: PgPool) {
    let owner = PlaceRepo::create(&pool, &new_place("Owner")).await.unwrap();
    let host = PlaceRepo::create(&pool, &new_place("Host")).await.unwrap();
    let pomucka = PomuckaRepo::create(&pool, &new_pomucka("Mapa")).await.unwrap();

    let created = InstanceRepo::create(
        &pool,
        &CreateInstance {
            pomucka_id: pomucka.id,
            place_id: owner.id,
        },
    )
    .await
    .unwrap();
    assert_eq!(created.owned_by, owner.id);
    assert_eq!(created.currently_at, owner.id);
    assert!(!created.loan_state().is_on_loan());

    let moved = InstanceRepo::update(
        &pool,
        created.id,
        &UpdateInstance {
            currently_at: Some(host.id),
            loan: LoanChange::Assign(renter()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(moved.owned_by, owner.id, "owner never changes");
    assert_eq!(moved.currently_at, host.id);
    assert_eq!(moved.loan_state().renter(), Some(&renter()));

    // Keep leaves the loan untouched while other fields change.
    let kept = InstanceRepo::update(
        &pool,
        created.id,
        &UpdateInstance {
            currently_at: None,
            loan: LoanChange::Keep,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(kept.loan_state().is_on_loan());
    assert_eq!(kept.currently_at, host.id);

    let cleared = InstanceRepo::update(
        &pool,
        created.id,
        &UpdateInstance {
            currently_at: None,
            loan: LoanChange::Clear,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(!cleared.loan_state().is_on_loan());
    assert!(cleared.rented_by_identifier.is_none());

    assert_eq!(InstanceRepo::list_at(&pool, host.id).await.unwrap().len(), 1);
    assert_eq!(InstanceRepo::list_at(&pool, owner.id).await.unwrap().len(), 0);
    assert_eq!(
        InstanceRepo::list_for_pomucka(&pool, pomucka.id).await.unwrap().len(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_relocation_to_missing_place_fails(pool: PgPool) {
    let owner = PlaceRepo::create(&pool, &new_place("Owner")).await.unwrap();
    let pomucka = PomuckaRepo::create(&pool, &new_pomucka("Mapa")).await.unwrap();
    let instance = InstanceRepo::create(
        &pool,
        &CreateInstance {
            pomucka_id: pomucka.id,
            place_id: owner.id,
        },
    )
    .await
    .unwrap();

    let err = InstanceRepo::update(
        &pool,
        instance.id,
        &UpdateInstance {
            currently_at: Some(999_999),
            loan: LoanChange::Keep,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.as_database_error().unwrap().kind(),
        sqlx::error::ErrorKind::ForeignKeyViolation
    );
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pomucka_update_and_delete_rules(pool: PgPool) {
    let place = PlaceRepo::create(&pool, &new_place("A")).await.unwrap();
    let pomucka = PomuckaRepo::create(&pool, &new_pomucka("Mapa")).await.unwrap();
    assert_eq!(pomucka.details.year, Some(1995));

    let mut update = UpdatePomucka {
        name: Some("Mapa ČR".into()),
        ..Default::default()
    };
    update.details.company = Some("Tyflopress".into());
    let updated = PomuckaRepo::update(&pool, pomucka.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.name, "Mapa ČR");
    assert_eq!(updated.details.company.as_deref(), Some("Tyflopress"));
    assert_eq!(updated.details.author.as_deref(), Some("Novák"));

    let image = ImageRepo::create(
        &pool,
        &CreateImage {
            pomucka_id: pomucka.id,
            alt: "front".into(),
            mimetype: "image/png".into(),
            data: vec![1, 2, 3],
        },
    )
    .await
    .unwrap();
    let with_image = PomuckaRepo::find_by_id(&pool, pomucka.id).await.unwrap().unwrap();
    assert_eq!(with_image.images, vec![image.id]);

    InstanceRepo::create(
        &pool,
        &CreateInstance {
            pomucka_id: pomucka.id,
            place_id: place.id,
        },
    )
    .await
    .unwrap();
    assert_eq!(PomuckaRepo::count_instances(&pool, pomucka.id).await.unwrap(), 1);
    assert!(PomuckaRepo::delete(&pool, pomucka.id).await.is_err());

    let bare = PomuckaRepo::create(&pool, &new_pomucka("Slabikář")).await.unwrap();
    let bare_image = ImageRepo::create(
        &pool,
        &CreateImage {
            pomucka_id: bare.id,
            alt: String::new(),
            mimetype: "image/jpeg".into(),
            data: vec![9],
        },
    )
    .await
    .unwrap();
    assert!(PomuckaRepo::delete(&pool, bare.id).await.unwrap());
    assert!(ImageRepo::find_blob(&pool, bare_image.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_image_mimetype_constraint(pool: PgPool) {
    let pomucka = PomuckaRepo::create(&pool, &new_pomucka("Mapa")).await.unwrap();
    let err = ImageRepo::create(
        &pool,
        &CreateImage {
            pomucka_id: pomucka.id,
            alt: String::new(),
            mimetype: "text/plain".into(),
            data: vec![1],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.as_database_error().unwrap().constraint(),
        Some("ck_images_mimetype")
    );
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats(pool: PgPool) {
    let a = PlaceRepo::create(&pool, &new_place("A")).await.unwrap();
    let b = PlaceRepo::create(&pool, &new_place("B")).await.unwrap();
    let pomucka = PomuckaRepo::create(&pool, &new_pomucka("Mapa")).await.unwrap();

    let create = CreateInstance {
        pomucka_id: pomucka.id,
        place_id: a.id,
    };
    let first = InstanceRepo::create(&pool, &create).await.unwrap();
    InstanceRepo::create(&pool, &create).await.unwrap();

    // First copy goes to B and is lent out from there.
    InstanceRepo::update(
        &pool,
        first.id,
        &UpdateInstance {
            currently_at: Some(b.id),
            loan: LoanChange::Assign(renter()),
        },
    )
    .await
    .unwrap();

    let totals = StatsRepo::catalog(&pool).await.unwrap();
    assert_eq!(totals.pomucky, 1);
    assert_eq!(totals.instances, 2);
    assert_eq!(totals.places, 2);
    assert_eq!(totals.on_loan, 1);

    let at_a = StatsRepo::for_place(&pool, a.id).await.unwrap();
    assert_eq!((at_a.owned, at_a.hosted, at_a.on_loan, at_a.lent_out), (2, 1, 0, 1));
    let at_b = StatsRepo::for_place(&pool, b.id).await.unwrap();
    assert_eq!((at_b.owned, at_b.hosted, at_b.on_loan, at_b.lent_out), (0, 1, 1, 0));
}
