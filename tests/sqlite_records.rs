#![cfg(feature = "sqlite")]

mod common;

use std::collections::HashSet;

use common::{Task, count_tasks, open_db, seeded_db};
use sql_compose::prelude::*;
use sql_compose::{Executor, SqliteOptions};

#[tokio::test]
async fn insert_and_update_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = open_db().await?;

    let new = vec![Task::new("a", 1, &["x", "y"]), Task::new("b", 2, &[])];
    let mut inserted = Vec::<Task>::new();
    scan_rows(
        &conn,
        append(&mut inserted),
        "INSERT INTO tasks ? RETURNING *",
        args![insert_sql(&new)],
    )
    .await?;

    assert_eq!(inserted.len(), 2);
    assert_eq!(inserted[0].id, 1);
    assert_eq!(inserted[1].id, 2);
    assert_eq!(inserted[0].tags.0, vec!["x".to_string(), "y".to_string()]);
    assert!(inserted[1].tags.is_empty());

    let mut changed = inserted[0].clone();
    changed.age = 41;
    changed.name = "renamed".into();
    let mut updated = Task::default();
    scan_row(
        &conn,
        &mut updated,
        "UPDATE tasks SET ? WHERE id = ? RETURNING *",
        args![update_sql(&changed), changed.id],
    )
    .await?;
    assert_eq!(updated, changed);

    let mut reloaded = Task::default();
    scan_row(
        &conn,
        &mut reloaded,
        "SELECT * FROM tasks WHERE id = ?",
        args![changed.id],
    )
    .await?;
    assert_eq!(reloaded, changed);
    Ok(())
}

#[tokio::test]
async fn json_null_decodes_to_default() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    let mut task = Task::default();
    scan_row(&conn, &mut task, "SELECT * FROM tasks WHERE name = ?", args!["c"]).await?;
    assert_eq!(task.age, 30);
    assert!(task.tags.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_row_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    let mut task = Task::default();
    let err = scan_row(&conn, &mut task, "SELECT * FROM tasks WHERE id = ?", args![999])
        .await
        .unwrap_err();
    assert!(err.is_no_rows());
    assert_eq!(task, Task::default());

    // The connection is still usable after the early return.
    assert_eq!(count_tasks(&conn).await?, 3);
    Ok(())
}

#[tokio::test]
async fn unknown_column_fails_scan() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    let mut task = Task::default();
    let err = scan_row(&conn, &mut task, "SELECT id, 1 AS extra FROM tasks", [])
        .await
        .unwrap_err();
    assert!(matches!(err, SqlComposeError::UnknownColumn(name) if name == "extra"));
    Ok(())
}

#[tokio::test]
async fn subset_of_columns_scans() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    let mut tasks = Vec::<Task>::new();
    scan_rows(
        &conn,
        append(&mut tasks),
        "SELECT name, id FROM tasks ORDER BY id DESC",
        [],
    )
    .await?;
    let got: Vec<(i64, &str)> = tasks.iter().map(|t| (t.id, t.name.as_str())).collect();
    assert_eq!(got, vec![(3, "c"), (2, "b"), (1, "a")]);
    assert!(tasks.iter().all(|t| t.age == 0));
    Ok(())
}

#[tokio::test]
async fn collects_single_columns() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    let mut ids = Vec::<i64>::new();
    scan_rows(
        &conn,
        append_value(&mut ids),
        "SELECT id FROM tasks WHERE id IN ? ORDER BY id",
        args![in_sql([3, 1])],
    )
    .await?;
    assert_eq!(ids, vec![1, 3]);

    let mut ages = HashSet::<i64>::new();
    scan_rows(
        &conn,
        set_value(&mut ages),
        "SELECT age / 20 FROM tasks",
        [],
    )
    .await?;
    assert_eq!(ages, HashSet::from([0, 1]));

    let mut boxed = Vec::<Box<Task>>::new();
    scan_rows(
        &conn,
        sql_compose::append_boxed(&mut boxed),
        "SELECT id, name FROM tasks WHERE age > ?",
        args![15],
    )
    .await?;
    assert_eq!(boxed.len(), 2);
    Ok(())
}

#[tokio::test]
async fn positional_scan_into_values() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    let (mut count, mut oldest, mut label) = (0_i64, 0_i64, None::<String>);
    scan_row(
        &conn,
        &mut values![&mut count, &mut oldest, &mut label],
        "SELECT COUNT(*), MAX(age), NULL FROM tasks",
        [],
    )
    .await?;
    assert_eq!((count, oldest, label), (3, 30, None));

    let mut only_one = 0_i64;
    let err = scan_row(
        &conn,
        &mut values![&mut only_one],
        "SELECT id, name FROM tasks",
        [],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SqlComposeError::ScanError(_)));
    Ok(())
}

#[tokio::test]
async fn nested_queries_reach_the_driver_flattened() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    let mut older = Query::new("SELECT id FROM tasks WHERE age > ?", args![15]);
    older.append("AND name <> ?", args!["c"]);
    let mut names = Vec::<String>::new();
    scan_rows(
        &conn,
        append_value(&mut names),
        "SELECT name FROM tasks WHERE id IN (?) OR name = ?",
        args![older, "a"],
    )
    .await?;
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    Ok(())
}

#[tokio::test]
async fn exec_reports_changes_through_the_connection() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    exec(&conn, "DELETE FROM tasks WHERE age < ?", args![25]).await?;
    assert_eq!(count_tasks(&conn).await?, 1);

    let result = conn
        .exec("UPDATE tasks SET age = age + 1 WHERE name = ?", &args!["c"])
        .await?;
    assert_eq!(result.rows_affected, 1);

    let missed = conn
        .exec("UPDATE tasks SET age = 0 WHERE name = ?", &args!["nobody"])
        .await?;
    assert_eq!(missed.rows_affected, 0);
    assert_eq!(missed.last_insert_id, None);

    let inserted = conn
        .exec("INSERT INTO tasks (name, age) VALUES (?, ?)", &args!["d", 40])
        .await?;
    assert_eq!(inserted.rows_affected, 1);
    assert_eq!(inserted.last_insert_id, Some(4));

    let read = conn.exec("SELECT * FROM tasks", &[]).await?;
    assert_eq!(read.rows_affected, 0);
    assert_eq!(read.last_insert_id, None);
    Ok(())
}

#[tokio::test]
async fn driver_errors_propagate() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = open_db().await?;

    let err = exec(&conn, "INSERT INTO nowhere VALUES (?)", args![1])
        .await
        .unwrap_err();
    assert!(matches!(err, SqlComposeError::SqliteError(_)));

    let err = exec(&conn, "INSERT INTO tasks (name, age) VALUES (?, ?)", args![None::<String>, 1])
        .await
        .unwrap_err();
    assert!(matches!(err, SqlComposeError::SqliteError(_)));
    assert_eq!(count_tasks(&conn).await?, 0);
    Ok(())
}

#[tokio::test]
async fn transactions_commit_and_roll_back() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, conn) = seeded_db().await?;

    let tx = conn.begin().await?;
    exec(&tx, "DELETE FROM tasks", []).await?;
    assert_eq!(count_tasks(&tx).await?, 0);
    let blocked = exec(&conn, "DELETE FROM tasks", []).await.unwrap_err();
    assert!(matches!(blocked, SqlComposeError::ExecutionError(_)));
    tx.rollback().await?;
    assert_eq!(count_tasks(&conn).await?, 3);

    let tx = conn.begin().await?;
    exec(&tx, "INSERT INTO tasks ?", args![insert_sql(&[Task::new("d", 40, &[])])]).await?;
    tx.commit().await?;
    assert_eq!(count_tasks(&conn).await?, 4);

    {
        let tx = conn.begin().await?;
        tx.exec_batch("DELETE FROM tasks;").await?;
    }
    assert_eq!(count_tasks(&conn).await?, 4);
    Ok(())
}

#[tokio::test]
async fn in_memory_databases_are_private() -> Result<(), Box<dyn std::error::Error>> {
    let first = SqliteConnection::open(SqliteOptions::in_memory()).await?;
    let second = SqliteConnection::open(SqliteOptions::in_memory()).await?;
    first.exec_batch(common::SCHEMA).await?;

    assert_eq!(count_tasks(&first).await?, 0);
    assert!(count_tasks(&second).await.is_err());
    Ok(())
}
