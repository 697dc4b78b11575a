mod common;

use common::{seeded_db, SuperHero};
use pretty_assertions::assert_eq;
use rowkit::driver::DbCursor;
use rowkit::metadata::Field;
use rowkit::types::read_column;
use rowkit::{args, QueryRunner, RowkitError};

#[test]
fn query_returns_all_rows() {
    let runner = QueryRunner::new();
    let (conn, heroes) = seeded_db(&runner);

    let mut found: Vec<SuperHero> = runner
        .query(&conn, "SELECT * FROM super_heroes", &args! {})
        .unwrap();
    found.sort_by(|a, b| a.name.cmp(&b.name));

    let mut expected = heroes.to_vec();
    expected.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(found, expected);
}

#[test]
fn query_with_no_matches_returns_empty_vec() {
    let runner = QueryRunner::new();
    let (conn, _) = seeded_db(&runner);

    let found: Vec<SuperHero> = runner
        .query(
            &conn,
            "SELECT * FROM super_heroes WHERE name = :name",
            &args! { "name" => "Aquaman" },
        )
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn query_between_binds_both_named_parameters() {
    let runner = QueryRunner::new();
    let (conn, heroes) = seeded_db(&runner);

    let found: Vec<SuperHero> = runner
        .query(
            &conn,
            "SELECT * FROM super_heroes WHERE age BETWEEN :fromAge AND :toAge",
            &args! { "fromAge" => 86, "toAge" => 89 },
        )
        .unwrap();

    assert_eq!(found, vec![heroes[0].clone()]);
    assert_eq!(found[0].age, Some(86));
}

#[test]
fn query_selecting_a_subset_of_columns_leaves_defaults() {
    let runner = QueryRunner::new();
    let (conn, heroes) = seeded_db(&runner);

    let found: Vec<SuperHero> = runner
        .query(
            &conn,
            "SELECT id, name FROM super_heroes WHERE name = :name",
            &args! { "name" => "Batman" },
        )
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, heroes[1].id);
    assert_eq!(found[0].email, None);
    assert_eq!(found[0].age, None);
}

#[test]
fn query_single_returns_the_matching_row() {
    let runner = QueryRunner::new();
    let (conn, heroes) = seeded_db(&runner);

    let found: Option<SuperHero> = runner
        .query_single(
            &conn,
            "SELECT * FROM super_heroes WHERE name = :name",
            &args! { "name" => "Superman" },
        )
        .unwrap();
    assert_eq!(found, Some(heroes[0].clone()));
}

#[test]
fn query_single_returns_none_for_no_match() {
    let runner = QueryRunner::new();
    let (conn, _) = seeded_db(&runner);

    let found: Option<SuperHero> = runner
        .query_single(
            &conn,
            "SELECT * FROM super_heroes WHERE name = :name",
            &args! { "name" => "Aquaman" },
        )
        .unwrap();
    assert_eq!(found, None);
}

#[test]
fn query_single_with_multiple_matches_reports_the_count() {
    let runner = QueryRunner::new();
    let (conn, _) = seeded_db(&runner);

    let err = runner
        .query_single::<SuperHero>(&conn, "SELECT * FROM super_heroes", &args! {})
        .unwrap_err();
    assert!(matches!(err, RowkitError::SingleResultExpected(3)));
    assert!(err.to_string().contains("3"));
}

#[test]
fn binding_an_unknown_argument_name_is_a_parse_error() {
    let runner = QueryRunner::new();
    let (conn, _) = seeded_db(&runner);

    let err = runner
        .query::<SuperHero>(
            &conn,
            "SELECT * FROM super_heroes WHERE name = :name",
            &args! { "nom" => "Superman" },
        )
        .unwrap_err();
    match err {
        RowkitError::Parse(message) => assert!(message.contains("nom")),
        other => panic!("expected a parse error, got {other}"),
    }
}

#[test]
fn blank_sql_is_rejected() {
    let runner = QueryRunner::new();
    let (conn, _) = seeded_db(&runner);

    let err = runner
        .query::<SuperHero>(&conn, "   ", &args! {})
        .unwrap_err();
    assert!(matches!(err, RowkitError::Parse(_)));
}

#[test]
fn query_with_accepts_a_custom_mapper_closure() {
    let runner = QueryRunner::new();
    let (conn, _) = seeded_db(&runner);

    let names: Vec<String> = runner
        .query_with(
            &conn,
            "SELECT name, age FROM super_heroes WHERE age > :age",
            &|cursor: &dyn DbCursor, fields: &[(String, Field)]| {
                let (_, field) = &fields[0];
                match read_column(cursor, field)? {
                    rowkit::Value::Text(name) => Ok(name),
                    other => panic!("unexpected value {other:?}"),
                }
            },
            &args! { "age" => 80 },
        )
        .unwrap();

    let mut names = names;
    names.sort();
    assert_eq!(names, vec!["Batman".to_string(), "Superman".to_string()]);
}

#[test]
fn column_aliases_match_components_case_insensitively() {
    let runner = QueryRunner::new();
    let (conn, heroes) = seeded_db(&runner);

    let found: Vec<SuperHero> = runner
        .query(
            &conn,
            "SELECT id, name, email as E_MAIL, age as AGE FROM super_heroes WHERE id = :id",
            &args! { "id" => heroes[2].id },
        )
        .unwrap();
    assert_eq!(found, vec![heroes[2].clone()]);
}
