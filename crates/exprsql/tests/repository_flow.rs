//! Repository behavior against a scripted in-memory executor.

use exprsql::{Dialect, Executor, Repository, SqlError, SqlResult, Table, col};
use std::sync::{Arc, Mutex};

#[derive(Table)]
#[sql(table = "Person")]
struct Person {
    #[sql(primary_key, auto_increment)]
    id: i64,
    name: String,
}

/// Captures every statement it receives; queries return one canned row per
/// entry in `rows`.
#[derive(Clone)]
struct ScriptedExecutor {
    dialect: Dialect,
    rows: Vec<&'static str>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedExecutor {
    fn new(dialect: Dialect, rows: Vec<&'static str>) -> Self {
        Self {
            dialect,
            rows,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Executor for ScriptedExecutor {
    type Row = &'static str;

    async fn query(&self, sql: &str) -> SqlResult<Vec<&'static str>> {
        self.log.lock().unwrap().push(sql.to_string());
        Ok(self.rows.clone())
    }

    async fn execute(&self, sql: &str) -> SqlResult<u64> {
        self.log.lock().unwrap().push(sql.to_string());
        Ok(sql.matches("),(").count() as u64 + 1)
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

fn people(n: usize) -> Vec<Person> {
    (0..n)
        .map(|i| Person {
            id: i as i64,
            name: format!("p{i}"),
        })
        .collect()
}

#[tokio::test]
async fn find_runs_an_unlimited_select() {
    let exec = ScriptedExecutor::new(Dialect::MySql, vec!["a", "b"]);
    let repo = Repository::<Person, _>::new(exec.clone()).unwrap();
    let rows = repo.find(&col("name").contains("li")).await.unwrap();
    assert_eq!(rows, ["a", "b"]);
    assert_eq!(
        exec.statements(),
        ["SELECT * FROM Person t WHERE t.name LIKE '%li%'"]
    );
}

#[tokio::test]
async fn find_first_takes_the_first_row_only() {
    let exec = ScriptedExecutor::new(Dialect::SqlServer, vec!["only"]);
    let repo = Repository::<Person, _>::new(exec.clone()).unwrap();
    let row = repo.find_first(&col("name").eq("Lee")).await.unwrap();
    assert_eq!(row, Some("only"));
    assert_eq!(
        exec.statements(),
        ["SELECT TOP 1 * FROM Person t WHERE t.name = 'Lee'"]
    );
}

#[tokio::test]
async fn find_first_on_no_rows_is_none() {
    let exec = ScriptedExecutor::new(Dialect::MySql, Vec::new());
    let repo = Repository::<Person, _>::new(exec).unwrap();
    let row = repo.find_first(&col("name").eq("nobody")).await.unwrap();
    assert_eq!(row, None);
}

#[tokio::test]
async fn batch_insert_executes_every_chunk_in_order() {
    let exec = ScriptedExecutor::new(Dialect::MySql, Vec::new());
    let repo = Repository::<Person, _>::new(exec.clone()).unwrap();
    let affected = repo.batch_insert_chunked(&people(5), 2).await.unwrap();
    assert_eq!(affected, 5);
    let statements = exec.statements();
    assert_eq!(statements.len(), 3);
    assert!(statements[0].starts_with("INSERT INTO Person (name) VALUES"));
    assert!(statements[2].ends_with("('p4')"));
}

#[tokio::test]
async fn batch_update_goes_through_the_executor() {
    let exec = ScriptedExecutor::new(Dialect::MySql, Vec::new());
    let repo = Repository::<Person, _>::new(exec.clone()).unwrap();
    repo.batch_update(&people(2)).await.unwrap();
    let statements = exec.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].starts_with("UPDATE Person a INNER JOIN ( SELECT"));
    assert!(statements[0].ends_with("SET a.name=b.name"));
}

#[tokio::test]
async fn compile_errors_never_reach_the_executor() {
    let exec = ScriptedExecutor::new(Dialect::MySql, Vec::new());
    let repo = Repository::<Person, _>::new(exec.clone()).unwrap();
    let err = repo
        .find(&col("name").in_values(Vec::<&str>::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, SqlError::TranslationAmbiguity { .. }));
    assert!(exec.statements().is_empty());
}
