//! Executes compiled filters against an in-memory SQLite database.
//!
//! Validates that the `Ansi` escaper produces SQL that SQLite accepts and
//! that each command selects the rows it should. `like` and `prefix` are not
//! covered here: they rely on adjacent literal concatenation, which SQLite
//! does not support.

use rest_filter::{Ansi, FilterCompiler, FilterSource};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE items (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price INTEGER NOT NULL,
            deleted_at TEXT
        );
        INSERT INTO items VALUES (1, 'apple', 5, NULL);
        INSERT INTO items VALUES (2, 'banana', 12, '2024-01-01');
        INSERT INTO items VALUES (3, 'cherry', 25, NULL);
        INSERT INTO items VALUES (4, 'O''Brien', 40, NULL);",
    )
    .unwrap();
    conn
}

fn select_ids(conn: &Connection, source: &FilterSource) -> Vec<i64> {
    let filter = FilterCompiler::new("items", Ansi).compile(source).unwrap();
    let sql = format!("SELECT id FROM items {filter} ORDER BY id");
    let mut stmt = conn.prepare(&sql).unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<i64>, _>>()
        .unwrap()
}

fn query(q: &str) -> FilterSource {
    FilterSource::from_query_string(q).unwrap()
}

fn json(body: &str) -> FilterSource {
    FilterSource::from_json(body).unwrap()
}

#[test]
fn empty_filter_selects_everything() {
    let conn = setup();
    assert_eq!(select_ids(&conn, &FilterSource::new()), vec![1, 2, 3, 4]);
}

#[test]
fn numeric_shortcut() {
    let conn = setup();
    assert_eq!(select_ids(&conn, &query("id=2")), vec![2]);
}

#[test]
fn text_eq_with_quote() {
    let conn = setup();
    assert_eq!(select_ids(&conn, &query("name=O%27Brien")), vec![4]);
}

#[test]
fn not_and_gt() {
    let conn = setup();
    assert_eq!(select_ids(&conn, &json(r#"{"price:gt": 10}"#)), vec![2, 3, 4]);
    assert_eq!(select_ids(&conn, &json(r#"{"price:gte": 25}"#)), vec![3, 4]);
    assert_eq!(select_ids(&conn, &query("name:not=apple")), vec![2, 3, 4]);
}

#[test]
fn in_list() {
    let conn = setup();
    assert_eq!(
        select_ids(&conn, &query("name[]=apple&name[]=cherry")),
        vec![1, 3]
    );
    assert_eq!(select_ids(&conn, &json(r#"{"id": [2, 4, 9]}"#)), vec![2, 4]);
}

#[test]
fn half_open_ranges() {
    let conn = setup();
    let source = json(r#"{"price:range": [[0, 12], [25, 41]]}"#);
    // 12 is excluded by the first range, 25 included by the second
    assert_eq!(select_ids(&conn, &source), vec![1, 3, 4]);
}

#[test]
fn notrange_with_ordered_bounds_matches_nothing() {
    let conn = setup();
    let source = json(r#"{"price:notrange": [[10, 30]]}"#);
    assert_eq!(select_ids(&conn, &source), Vec::<i64>::new());
}

#[test]
fn null_and_chain() {
    let conn = setup();
    assert_eq!(select_ids(&conn, &query("deleted_at:null")), vec![1, 3, 4]);
    // IS NULL OR != '2024-01-01'; a NULL row only matches the first branch
    assert_eq!(
        select_ids(&conn, &query("deleted_at:null:not=2024-01-01")),
        vec![1, 3, 4]
    );
}

#[test]
fn group_or() {
    let conn = setup();
    let source = json(r#"{"(id,price):gte": 25}"#);
    assert_eq!(select_ids(&conn, &source), vec![3, 4]);
}

#[test]
fn keys_combine_with_and() {
    let conn = setup();
    let source = json(r#"{"deleted_at:null": null, "price:gt": 10}"#);
    assert_eq!(select_ids(&conn, &source), vec![3, 4]);
}

#[test]
fn injection_in_value_matches_nothing() {
    let conn = setup();
    let source = query("name=x%27+OR+%271%27%3D%271");
    assert_eq!(select_ids(&conn, &source), Vec::<i64>::new());
}

#[test]
fn injection_in_field_is_an_unknown_column() {
    let conn = setup();
    let source = query("id%22+%3D+1+OR+%221=1");
    let filter = FilterCompiler::new("items", Ansi).compile(&source).unwrap();
    let sql = format!("SELECT id FROM items {filter}");
    assert!(conn.prepare(&sql).is_err());
}
