use customer_db_core::{CustomerMatch, CustomerRepository, SqliteCustomerRepository, StoreConfig};
use tempfile::TempDir;

fn setup() -> (TempDir, SqliteCustomerRepository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteCustomerRepository::new(StoreConfig::new(dir.path().join("customers.db")));
    repo.initialize_schema().unwrap();
    repo.reset_all().unwrap();
    (dir, repo)
}

#[test]
fn end_to_end_add_update_find() {
    let (_dir, repo) = setup();
    let id = repo.add_customer("Ivan", "Ivanov", "ivan@x.com").unwrap();
    repo.add_phone(id, "+1234567890").unwrap();
    repo.update_customer(id, "Ivan", "Ivanov", "ivan@new.com").unwrap();

    let rows: Vec<CustomerMatch> = repo.find_customers("ivan@new.com").unwrap().collect();

    assert_eq!(
        rows,
        vec![CustomerMatch {
            id,
            first_name: "Ivan".to_string(),
            last_name: "Ivanov".to_string(),
            email: "ivan@new.com".to_string(),
            phone_number: Some("+1234567890".to_string()),
        }]
    );
    assert_eq!(repo.find_customers("ivan@x.com").unwrap().len(), 0);
}

#[test]
fn customer_with_two_phones_appears_once_per_phone() {
    let (_dir, repo) = setup();
    let id = repo.add_customer("Ivan", "Ivanov", "ivan@x.com").unwrap();
    repo.add_phone(id, "+100").unwrap();
    repo.add_phone(id, "+200").unwrap();

    let phones: Vec<Option<String>> = repo
        .find_customers("ivan@x.com")
        .unwrap()
        .map(|row| row.phone_number)
        .collect();

    assert_eq!(
        phones,
        vec![Some("+100".to_string()), Some("+200".to_string())]
    );
}

#[test]
fn search_by_phone_returns_only_the_matching_phone_row() {
    let (_dir, repo) = setup();
    let id = repo.add_customer("Ivan", "Ivanov", "ivan@x.com").unwrap();
    repo.add_phone(id, "+100").unwrap();
    repo.add_phone(id, "+200").unwrap();

    let rows: Vec<CustomerMatch> = repo.find_customers("+200").unwrap().collect();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].phone_number.as_deref(), Some("+200"));
}

#[test]
fn customer_without_phones_is_returned_with_empty_phone() {
    let (_dir, repo) = setup();
    let id = repo.add_customer("Petr", "Petrov", "petr@x.com").unwrap();

    let rows: Vec<CustomerMatch> = repo.find_customers("Petrov").unwrap().collect();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert!(rows[0].phone_number.is_none());
}

#[test]
fn search_matches_any_of_the_four_fields() {
    let (_dir, repo) = setup();
    let ivan = repo.add_customer("Ivan", "Ivanov", "ivan@x.com").unwrap();
    repo.add_phone(ivan, "+100").unwrap();
    let other = repo.add_customer("Anna", "Ivan", "anna@x.com").unwrap();

    let ids: Vec<i64> = repo
        .find_customers("Ivan")
        .unwrap()
        .map(|row| row.id)
        .collect();
    assert_eq!(ids, vec![ivan, other]);

    for term in ["Ivanov", "ivan@x.com", "+100"] {
        let rows: Vec<CustomerMatch> = repo.find_customers(term).unwrap().collect();
        assert_eq!(rows.len(), 1, "term {term}");
        assert_eq!(rows[0].id, ivan);
    }
}

#[test]
fn search_requires_exact_equality() {
    let (_dir, repo) = setup();
    let id = repo.add_customer("Ivan", "Ivanov", "ivan@x.com").unwrap();
    repo.add_phone(id, "+1234567890").unwrap();

    for term in ["Iva", "ivan", "ivan@x", "1234567890", "%", ""] {
        assert_eq!(repo.find_customers(term).unwrap().len(), 0, "term {term}");
    }
}

#[test]
fn search_result_is_a_single_pass_sequence() {
    let (_dir, repo) = setup();
    let id = repo.add_customer("Ivan", "Ivanov", "ivan@x.com").unwrap();
    repo.add_phone(id, "+100").unwrap();
    repo.add_phone(id, "+200").unwrap();

    let mut matches = repo.find_customers("Ivan").unwrap();
    assert_eq!(matches.len(), 2);

    assert!(matches.next().is_some());
    assert_eq!(matches.len(), 1);
    assert!(matches.next().is_some());
    assert!(matches.next().is_none());
    assert!(matches.next().is_none());
}

#[test]
fn search_before_schema_reports_statement_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteCustomerRepository::new(StoreConfig::new(dir.path().join("customers.db")));

    let err = repo.find_customers("Ivan").unwrap_err();

    assert!(err.statement().unwrap_or("").contains("LEFT JOIN phones"));
}
