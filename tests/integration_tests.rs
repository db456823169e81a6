//! Integration tests against a live Postgres instance.
//!
//! Run with a reachable DATABASE_URL:
//!     cargo test -- --ignored

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use librarium::{
    models::{
        book::{Availability, CreateBook, UpdateBook},
        member::{CreateMember, MembershipType, Role, UpdateMember},
        loan::LoanStatus,
    },
    AppConfig, AppError, Library,
};
use rust_decimal::Decimal;

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Unique suffix so tests never collide on the unique isbn/email indexes.
fn unique() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}-{}", nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}

async fn library() -> Library {
    let config = AppConfig::load().expect("Failed to load configuration");
    Library::connect(config).await.expect("Failed to connect to store")
}

fn sample_book(tag: &str) -> CreateBook {
    CreateBook {
        title: format!("Integration Test Book {}", tag),
        authors: "Test Author".to_string(),
        genre: Some("Testing".to_string()),
        publisher: None,
        isbn: format!("it-{}", tag),
        edition: None,
        published_year: Some(2020),
        price: Some(Decimal::new(999, 2)),
        rack_location: Some("T1".to_string()),
        language: Some("English".to_string()),
        availability: Availability::Available,
    }
}

fn sample_member(tag: &str) -> CreateMember {
    CreateMember {
        name: format!("Test Member {}", tag),
        email: format!("member-{}@example.org", tag),
        membership_type: MembershipType::Regular,
        role: Role::User,
        password: "secret".to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn added_book_is_searchable_and_isbn_is_unique() {
    let lib = library().await;
    let tag = unique();

    let book = sample_book(&tag);
    let id = lib.services.catalog.add_book(book.clone()).await.unwrap();

    let found = lib.services.catalog.search_books(&book.title).await.unwrap();
    assert!(found.iter().any(|b| b.id == id));

    // LIKE metacharacters in the search text match literally, not as
    // wildcards: no title contains a percent sign.
    let found = lib
        .services
        .catalog
        .search_books(&format!("%{}%", tag))
        .await
        .unwrap();
    assert!(found.is_empty());

    let err = lib.services.catalog.add_book(book).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
}

#[tokio::test]
#[ignore]
async fn issue_flips_availability_and_return_restores_it() {
    let lib = library().await;
    let tag = unique();

    let book_id = lib.services.catalog.add_book(sample_book(&tag)).await.unwrap();
    let member_id = lib.services.membership.add_member(sample_member(&tag)).await.unwrap();

    let loan = lib.services.circulation.issue_book(book_id, member_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Issued);

    let book = lib.services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(book.availability, Availability::Unavailable);

    // Unavailable books cannot be issued again.
    let err = lib
        .services
        .circulation
        .issue_book(book_id, member_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    let receipt = lib.services.circulation.return_book(loan.id).await.unwrap();
    assert_eq!(receipt.fine, Decimal::ZERO);

    let book = lib.services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(book.availability, Availability::Available);

    // Returning twice is a conflict and changes nothing.
    let err = lib.services.circulation.return_book(loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
}

#[tokio::test]
#[ignore]
async fn issue_respects_the_member_loan_limit() {
    let lib = library().await;
    let tag = unique();

    let member_id = lib.services.membership.add_member(sample_member(&tag)).await.unwrap();

    // Default policy allows 5 open loans.
    for i in 0..5 {
        let book_id = lib
            .services
            .catalog
            .add_book(sample_book(&format!("{}-{}", tag, i)))
            .await
            .unwrap();
        lib.services.circulation.issue_book(book_id, member_id).await.unwrap();
    }

    let extra = lib
        .services
        .catalog
        .add_book(sample_book(&format!("{}-extra", tag)))
        .await
        .unwrap();
    let err = lib
        .services
        .circulation
        .issue_book(extra, member_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LimitReached(_)), "got {:?}", err);

    // The spare book is untouched.
    let book = lib.services.catalog.get_book(extra).await.unwrap();
    assert_eq!(book.availability, Availability::Available);
}

#[tokio::test]
#[ignore]
async fn reserving_an_available_book_is_rejected() {
    let lib = library().await;
    let tag = unique();

    let book_id = lib.services.catalog.add_book(sample_book(&tag)).await.unwrap();
    let member_id = lib.services.membership.add_member(sample_member(&tag)).await.unwrap();

    let err = lib
        .services
        .circulation
        .reserve_book(book_id, member_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    // Once issued to someone else the book becomes reservable.
    let other = lib
        .services
        .membership
        .add_member(sample_member(&format!("{}-other", tag)))
        .await
        .unwrap();
    lib.services.circulation.issue_book(book_id, other).await.unwrap();

    let reservation = lib
        .services
        .circulation
        .reserve_book(book_id, member_id)
        .await
        .unwrap();
    assert_eq!(reservation.status, LoanStatus::Reserved);

    // A reservation is not an open loan and cannot be returned.
    let err = lib
        .services
        .circulation
        .return_book(reservation.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
}

#[tokio::test]
#[ignore]
async fn bulk_import_is_best_effort() {
    let lib = library().await;
    let tag = unique();

    let csv = format!(
        "Book One {tag},Author A,Fiction,Pub,bulk-{tag}-1,1st,2001,10.00,A1,English,Yes\n\
         \"Book, Two {tag}\",Author B,Fiction,Pub,bulk-{tag}-2,1st,2002,11.00,A1,English,Yes\n\
         Book Three {tag},Author C,Fiction,Pub,bulk-{tag}-3,1st,not-a-year,12.00,A1,English,Yes\n\
         Book Four {tag},Author D,Fiction,Pub,bulk-{tag}-4,1st,2004,13.00,A1,English,No\n\
         Book Five {tag},Author E,Fiction,Pub,bulk-{tag}-5,1st,2005,14.00,A1,English,Yes\n",
        tag = tag
    );

    let report = lib
        .services
        .catalog
        .bulk_import(csv.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.added, 4);
    assert_eq!(report.skipped(), 1);

    // The quoted title survived with its comma intact.
    let found = lib
        .services
        .catalog
        .search_books(&format!("Book, Two {}", tag))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
#[ignore]
async fn member_with_open_loans_cannot_be_deleted() {
    let lib = library().await;
    let tag = unique();

    let book_id = lib.services.catalog.add_book(sample_book(&tag)).await.unwrap();
    let member_id = lib.services.membership.add_member(sample_member(&tag)).await.unwrap();
    let loan = lib.services.circulation.issue_book(book_id, member_id).await.unwrap();

    let err = lib.services.membership.delete_member(member_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    lib.services.circulation.return_book(loan.id).await.unwrap();
    lib.services.membership.delete_member(member_id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn partial_updates_only_touch_supplied_fields() {
    let lib = library().await;
    let tag = unique();

    let id = lib.services.catalog.add_book(sample_book(&tag)).await.unwrap();

    let err = lib
        .services
        .catalog
        .update_book(id, UpdateBook::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);

    // A supplied-but-blank required field is rejected, not written.
    let err = lib
        .services
        .catalog
        .update_book(
            id,
            UpdateBook {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);

    let updated = lib
        .services
        .catalog
        .update_book(
            id,
            UpdateBook {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.authors, "Test Author");

    // Keeping its own ISBN is not a conflict.
    let same_isbn = lib
        .services
        .catalog
        .update_book(
            id,
            UpdateBook {
                isbn: Some(format!("it-{}", tag)),
                ..Default::default()
            },
        )
        .await;
    assert!(same_isbn.is_ok());

    // Taking another book's ISBN is.
    let other_tag = unique();
    lib.services.catalog.add_book(sample_book(&other_tag)).await.unwrap();
    let err = lib
        .services
        .catalog
        .update_book(
            id,
            UpdateBook {
                isbn: Some(format!("it-{}", other_tag)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
}

#[tokio::test]
#[ignore]
async fn history_is_newest_first() {
    let lib = library().await;
    let tag = unique();

    let member_id = lib.services.membership.add_member(sample_member(&tag)).await.unwrap();

    for i in 0..3 {
        let book_id = lib
            .services
            .catalog
            .add_book(sample_book(&format!("{}-{}", tag, i)))
            .await
            .unwrap();
        let loan = lib.services.circulation.issue_book(book_id, member_id).await.unwrap();
        lib.services.circulation.return_book(loan.id).await.unwrap();
    }

    let history = lib.services.circulation.history(member_id).await.unwrap();
    assert_eq!(history.len(), 3);
    for pair in history.windows(2) {
        assert!(pair[0].issue_date >= pair[1].issue_date);
    }
}

#[tokio::test]
#[ignore]
async fn authentication_requires_matching_role() {
    let lib = library().await;
    let tag = unique();

    let member = sample_member(&tag);
    lib.services.membership.add_member(member.clone()).await.unwrap();

    let authenticated = lib
        .services
        .membership
        .authenticate(&member.name, &member.password, Role::User)
        .await
        .unwrap();
    assert_eq!(authenticated.email, member.email);

    let err = lib
        .services
        .membership
        .authenticate(&member.name, &member.password, Role::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)), "got {:?}", err);
}

#[tokio::test]
#[ignore]
async fn update_member_enforces_email_uniqueness() {
    let lib = library().await;
    let tag = unique();
    let other_tag = unique();

    let first = lib.services.membership.add_member(sample_member(&tag)).await.unwrap();
    lib.services.membership.add_member(sample_member(&other_tag)).await.unwrap();

    let err = lib
        .services
        .membership
        .update_member(
            first,
            UpdateMember {
                email: Some(format!("member-{}@example.org", other_tag)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    let renamed = lib
        .services
        .membership
        .update_member(
            first,
            UpdateMember {
                name: Some("Renamed Member".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed Member");
}

#[tokio::test]
#[ignore]
async fn reports_export_to_csv_files() {
    let lib = library().await;
    let dir = tempfile::tempdir().expect("tempdir");

    lib.services.reports.export_reports(dir.path()).await.unwrap();

    for (file, header) in [
        ("top_issued_books.csv", "BookID,Title,IssueCount"),
        ("active_members.csv", "MemberID,Name,BooksIssued"),
        ("fine_summary.csv", "MemberID,Name,TotalFine"),
    ] {
        let contents = std::fs::read_to_string(dir.path().join(file)).unwrap();
        assert!(
            contents.starts_with(header),
            "{} missing header, got: {}",
            file,
            contents.lines().next().unwrap_or("")
        );
    }
}
