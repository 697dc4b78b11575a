//! Shared fixture: an in-memory database with the super_heroes table.
#![allow(dead_code)] // not every test binary uses every helper

use rowkit::driver::SqliteConnection;
use rowkit::{args, row_record, QueryRunner};
use uuid::Uuid;

row_record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct SuperHero {
        pub id: Uuid,
        pub name: String,
        pub email: Option<String>,
        pub age: Option<i32>,
    }
}

impl SuperHero {
    pub fn new(name: &str, email: &str, age: i32) -> Self {
        SuperHero {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: Some(email.to_string()),
            age: Some(age),
        }
    }
}

pub fn superman() -> SuperHero {
    SuperHero::new("Superman", "superman@dc.com", 86)
}

pub fn batman() -> SuperHero {
    SuperHero::new("Batman", "batman@dc.com", 85)
}

pub fn spider_man() -> SuperHero {
    SuperHero::new("Spider-man", "spider@marvel.com", 62)
}

/// Route test logs through tracing; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn open_db() -> SqliteConnection {
    init_tracing();
    let conn = SqliteConnection::open_in_memory().expect("open in-memory database");
    conn.execute_batch_sql(
        "CREATE TABLE super_heroes (
            id UUID NOT NULL,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100),
            age INTEGER
        );",
    )
    .expect("create schema");
    conn
}

pub fn insert_hero(runner: &QueryRunner, conn: &SqliteConnection, hero: &SuperHero) {
    runner
        .execute(
            conn,
            "INSERT INTO super_heroes(id, name, email, age) VALUES (:id, :name, :email, :age)",
            &args! {
                "id" => hero.id,
                "name" => hero.name.clone(),
                "email" => hero.email.clone(),
                "age" => hero.age,
            },
        )
        .expect("insert hero");
}

/// Database seeded with the three standard heroes.
pub fn seeded_db(runner: &QueryRunner) -> (SqliteConnection, [SuperHero; 3]) {
    let conn = open_db();
    let heroes = [superman(), batman(), spider_man()];
    for hero in &heroes {
        insert_hero(runner, &conn, hero);
    }
    (conn, heroes)
}
