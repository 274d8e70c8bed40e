//! End-to-end compilation through the derive macro.
//!
//! Exercises the full path from a derived record type to finished SQL text,
//! without any executor in the loop.

use exprsql::{
    ArgMap, DEFAULT_ALIAS, Dialect, SqlValue, Table, TableMeta, analyze, build_select, col,
    insert_statements, update_statements,
};

#[derive(Table)]
#[sql(table = "Person")]
struct Person {
    #[sql(primary_key, auto_increment)]
    id: i64,
    #[sql(column = "FullName")]
    name: String,
    age: i32,
    email: Option<String>,
}

fn person(id: i64, name: &str, age: i32, email: Option<&str>) -> Person {
    Person {
        id,
        name: name.to_string(),
        age,
        email: email.map(str::to_string),
    }
}

fn compile(expr: &exprsql::Expr, dialect: Dialect, limit: u64) -> String {
    let meta = TableMeta::of::<Person>().unwrap();
    let analysis = analyze(expr, &meta, DEFAULT_ALIAS, &ArgMap::new()).unwrap();
    build_select(&meta, &analysis, DEFAULT_ALIAS, dialect, limit)
}

#[test]
fn derive_exposes_column_metadata() {
    let meta = TableMeta::of::<Person>().unwrap();
    assert_eq!(meta.table(), "Person");
    assert_eq!(meta.sql_column("name").unwrap(), "FullName");
    assert_eq!(meta.sql_column("age").unwrap(), "age");
    let pks: Vec<_> = meta.primary_keys().map(|c| c.field).collect();
    assert_eq!(pks, ["id"]);
}

#[test]
fn compound_predicate_compiles_to_parenthesized_where() {
    let e = col("age").ge(18).and(col("name").starts_with("A"));
    assert_eq!(
        compile(&e, Dialect::MySql, 0),
        "SELECT * FROM Person t WHERE ( t.age >= 18 ) AND ( t.FullName LIKE 'A%' )"
    );
}

#[test]
fn dialects_differ_only_in_row_limiting() {
    let e = col("age").ge(18);
    assert_eq!(
        compile(&e, Dialect::SqlServer, 5),
        "SELECT TOP 5 * FROM Person t WHERE t.age >= 18"
    );
    assert_eq!(
        compile(&e, Dialect::MySql, 5),
        "SELECT * FROM Person t WHERE t.age >= 18 LIMIT 5"
    );
}

#[test]
fn value_side_arguments_resolve_by_name() {
    let meta = TableMeta::of::<Person>().unwrap();
    let mut args = ArgMap::new();
    args.insert("minAge".to_string(), SqlValue::Int(21));
    let analysis = analyze(&col("age").ge(col("minAge")), &meta, DEFAULT_ALIAS, &args).unwrap();
    assert_eq!(analysis.tokens.render(), "[t].age >= 21");
    assert_eq!(analysis.params.get("@minAge"), Some(&SqlValue::Int(21)));
}

#[test]
fn empty_in_list_refuses_to_compile() {
    let meta = TableMeta::of::<Person>().unwrap();
    let err = analyze(
        &col("age").in_values(Vec::<i32>::new()),
        &meta,
        DEFAULT_ALIAS,
        &ArgMap::new(),
    )
    .unwrap_err();
    assert!(err.is_ambiguity());
}

#[test]
fn insert_skips_generated_key_and_renders_options() {
    let rows = [
        person(0, "O'Brien", 40, Some("ob@example.com")),
        person(0, "Lee", 35, None),
    ];
    let stmts = insert_statements(&rows, 100).unwrap();
    assert_eq!(
        stmts[0],
        "INSERT INTO Person (FullName,age,email) VALUES \
         ('O''Brien',40,'ob@example.com'),('Lee',35,NULL)"
    );
}

#[test]
fn update_joins_on_derived_primary_key() {
    let rows = [person(7, "Lee", 36, None)];
    let stmts = update_statements(&rows, 100).unwrap();
    assert_eq!(
        stmts[0],
        "UPDATE Person a INNER JOIN \
         ( SELECT 7 AS id,'Lee' AS FullName,36 AS age,NULL AS email ) b \
         ON a.id=b.id SET a.FullName=b.FullName,a.age=b.age,a.email=b.email"
    );
}

#[test]
fn large_batches_chunk_by_ceiling_division() {
    let rows: Vec<Person> = (0..7).map(|i| person(i, "p", 20, None)).collect();
    let stmts = insert_statements(&rows, 3).unwrap();
    assert_eq!(stmts.len(), 3);
    let stmts = update_statements(&rows, 3).unwrap();
    assert_eq!(stmts.len(), 3);
}
