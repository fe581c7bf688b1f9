#[cfg(test)]
mod tests {
    use crate::{
        STATUS_FILE, config, config_builder,
        doubles::{FlakyStore, MockSession, RecordingSink},
        order, orders,
    };
    use connectors::sql::base::error::DbError;
    use engine_core::{
        serializer::{BodyFormat, EventFormat},
        state::{StateStore, status_file::StatusFileStore},
    };
    use engine_processing::{
        error::PollError,
        health::Health,
        producer::poller::{CycleOutcome, ExecutorState, PollingExecutor},
    };
    use model::{pagination::cursor::Cursor, records::event::HEADER_TIMESTAMP};
    use std::{path::Path, sync::Arc, time::Duration};
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    fn store(dir: &Path) -> StatusFileStore {
        StatusFileStore::new(dir, STATUS_FILE)
    }

    fn persisted_cursor(dir: &Path) -> Cursor {
        store(dir)
            .read()
            .unwrap()
            .expect("checkpoint exists")
            .last_value
    }

    async fn executor(
        dir: &Path,
        session: &Arc<MockSession>,
        sink: &Arc<RecordingSink>,
    ) -> PollingExecutor {
        PollingExecutor::new(
            &config(dir),
            session.clone(),
            sink.clone(),
            Arc::new(store(dir)),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn construction_seeds_checkpoint() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("nested/status");

        let exec = executor(&dir, &MockSession::new(), &RecordingSink::new()).await;

        assert_eq!(exec.state(), ExecutorState::Created);
        assert_eq!(exec.cursor(), &Cursor::new("0"));
        assert!(dir.is_dir());
        assert_eq!(persisted_cursor(&dir), Cursor::new("0"));
    }

    #[tokio::test]
    #[traced_test]
    async fn commits_after_all_rows_are_delivered() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(orders(1..=3));
        let sink = RecordingSink::new();
        let mut exec = executor(tmp.path(), &session, &sink).await;

        let outcome = exec.run_cycle(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Committed {
                rows: 3,
                batches: 1,
                cursor: Cursor::new("3")
            }
        );
        assert_eq!(exec.state(), ExecutorState::Running);
        assert_eq!(exec.cursor(), &Cursor::new("3"));
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("3"));
        assert_eq!(sink.row_count(), 3);
        assert_eq!(
            session.queries(),
            vec!["SELECT * FROM orders WHERE id > '0' ORDER BY id ASC LIMIT 100".to_string()]
        );
        assert!(logs_contain("Committed cursor"));
    }

    #[tokio::test]
    async fn next_cycle_queries_from_committed_cursor() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(orders(1..=2)).push_rows(orders(3..=3));
        let mut exec = executor(tmp.path(), &session, &RecordingSink::new()).await;
        let cancel = CancellationToken::new();

        exec.run_cycle(&cancel).await.unwrap();
        exec.run_cycle(&cancel).await.unwrap();
        let outcome = exec.run_cycle(&cancel).await.unwrap();

        assert_eq!(outcome, CycleOutcome::Empty);
        let queries = session.queries();
        assert!(queries[1].contains("WHERE id > '2'"));
        assert!(queries[2].contains("WHERE id > '3'"));
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("3"));
    }

    #[tokio::test]
    async fn empty_result_commits_nothing() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        let flaky = FlakyStore::new(store(tmp.path()));
        let mut exec = PollingExecutor::new(
            &config(tmp.path()),
            session.clone(),
            RecordingSink::new(),
            flaky.clone(),
        )
        .await
        .unwrap();
        let seeded = flaky.writes();

        let outcome = exec.run_cycle(&CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, CycleOutcome::Empty);
        assert_eq!(flaky.writes(), seeded);
        assert_eq!(exec.metrics().snapshot().commits, 0);
    }

    #[tokio::test]
    async fn delivery_failure_does_not_commit() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(orders(1..=3)).push_rows(orders(1..=3));
        let sink = RecordingSink::failing();
        let mut exec = executor(tmp.path(), &session, &sink).await;

        let err = exec.run_cycle(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PollError::Deliver { .. }));
        assert_eq!(exec.cursor(), &Cursor::new("0"));
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("0"));

        // the same rows are fetched again once the sink recovers
        sink.set_failing(false);
        exec.run_cycle(&CancellationToken::new()).await.unwrap();
        assert_eq!(session.queries()[0], session.queries()[1]);
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("3"));
    }

    #[tokio::test]
    async fn commit_failure_keeps_cursor_and_refetches() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(orders(1..=3)).push_rows(orders(1..=3));
        let sink = RecordingSink::new();
        let flaky = FlakyStore::new(store(tmp.path()));
        let mut exec = PollingExecutor::new(
            &config(tmp.path()),
            session.clone(),
            sink.clone(),
            flaky.clone(),
        )
        .await
        .unwrap();
        let seeded = flaky.writes();

        flaky.set_failing(true);
        let err = exec.run_cycle(&CancellationToken::new()).await.unwrap_err();
        assert!(
            matches!(&err, PollError::Commit { cursor, .. } if cursor == &Cursor::new("3")),
            "unexpected error: {err}"
        );
        assert_eq!(exec.cursor(), &Cursor::new("0"));
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("0"));
        assert_eq!(flaky.writes(), seeded);
        assert_eq!(exec.metrics().snapshot().commits, 0);

        flaky.set_failing(false);
        let outcome = exec.run_cycle(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Committed {
                rows: 3,
                batches: 1,
                cursor: Cursor::new("3"),
            }
        );
        let queries = session.queries();
        assert!(queries[0].contains("WHERE id > '0'"));
        assert!(queries[1].contains("WHERE id > '0'"));
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("3"));
        // delivered twice, at-least-once
        assert_eq!(sink.row_count(), 6);
    }

    #[tokio::test]
    async fn partial_delivery_does_not_commit() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(orders(1..=5));
        let sink = RecordingSink::failing_after(1);
        let exec_config = config_builder(tmp.path()).batch_size(2).build().unwrap();
        let mut exec = PollingExecutor::new(
            &exec_config,
            session.clone(),
            sink.clone(),
            Arc::new(store(tmp.path())),
        )
        .await
        .unwrap();

        assert!(exec.run_cycle(&CancellationToken::new()).await.is_err());
        assert_eq!(sink.batches().len(), 1);
        assert_eq!(exec.cursor(), &Cursor::new("0"));
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("0"));
    }

    #[tokio::test]
    async fn rows_are_delivered_in_batch_sized_chunks() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(orders(1..=5));
        let sink = RecordingSink::new();
        let exec_config = config_builder(tmp.path()).batch_size(2).build().unwrap();
        let mut exec = PollingExecutor::new(
            &exec_config,
            session.clone(),
            sink.clone(),
            Arc::new(store(tmp.path())),
        )
        .await
        .unwrap();

        let outcome = exec.run_cycle(&CancellationToken::new()).await.unwrap();

        assert!(matches!(outcome, CycleOutcome::Committed { batches: 3, .. }));
        let sizes: Vec<usize> = sink.batches().iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let ids: Vec<String> = sink.batches().iter().map(|b| b.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_eq!(exec.metrics().snapshot().batches_delivered, 3);
        assert_eq!(exec.metrics().snapshot().commits, 1);
    }

    #[tokio::test]
    async fn batch_ids_repeat_on_replay() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(orders(1..=2)).push_rows(orders(1..=2));
        let sink = RecordingSink::new();
        let flaky = FlakyStore::new(store(tmp.path()));
        let mut exec = PollingExecutor::new(
            &config(tmp.path()),
            session.clone(),
            sink.clone(),
            flaky.clone(),
        )
        .await
        .unwrap();

        flaky.set_failing(true);
        let err = exec.run_cycle(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PollError::Commit { .. }));
        assert_eq!(exec.cursor(), &Cursor::new("0"));

        flaky.set_failing(false);
        exec.run_cycle(&CancellationToken::new()).await.unwrap();

        let batches = sink.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].id, batches[1].id);
        assert_eq!(exec.cursor(), &Cursor::new("2"));
    }

    #[tokio::test]
    async fn cancelled_query_leaves_cursor_and_checkpoint() {
        let tmp = tempdir().unwrap();
        let session = MockSession::hanging();
        let sink = RecordingSink::new();
        let mut exec = executor(tmp.path(), &session, &sink).await;
        exec.set_cursor("7");

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let watcher = session.clone();
        tokio::spawn(async move {
            watcher.query_started().await;
            trigger.cancel();
        });

        let outcome = tokio::time::timeout(Duration::from_secs(5), exec.run_cycle(&cancel))
            .await
            .expect("cycle stops once cancelled")
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Cancelled);
        assert_eq!(exec.cursor(), &Cursor::new("7"));
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("0"));
        assert!(sink.batches().is_empty());
    }

    #[tokio::test]
    async fn committed_cursor_is_restored_on_restart() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(vec![order(4), order(10)]);

        let mut first = executor(tmp.path(), &session, &RecordingSink::new()).await;
        first.run_cycle(&CancellationToken::new()).await.unwrap();
        first.stop().await;
        assert!(session.is_closed());

        let fresh = executor(tmp.path(), &MockSession::new(), &RecordingSink::new()).await;
        assert_eq!(fresh.cursor(), &Cursor::new("10"));
    }

    #[tokio::test]
    async fn stopped_executor_refuses_cycles() {
        let tmp = tempdir().unwrap();
        let mut exec = executor(tmp.path(), &MockSession::new(), &RecordingSink::new()).await;

        exec.stop().await;
        assert_eq!(exec.state(), ExecutorState::Stopped);
        assert!(matches!(
            exec.run_cycle(&CancellationToken::new()).await,
            Err(PollError::Stopped)
        ));
    }

    #[tokio::test]
    async fn set_cursor_is_in_memory_only() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        let mut exec = executor(tmp.path(), &session, &RecordingSink::new()).await;

        exec.set_cursor("2015-01-01 00:00:00");
        assert_eq!(exec.cursor(), &Cursor::new("2015-01-01 00:00:00"));
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("0"));

        exec.run_cycle(&CancellationToken::new()).await.unwrap();
        assert!(session.queries()[0].contains("WHERE id > '2015-01-01 00:00:00'"));
    }

    #[tokio::test]
    async fn reports_configured_query() {
        let tmp = tempdir().unwrap();
        let exec = executor(tmp.path(), &MockSession::new(), &RecordingSink::new()).await;
        assert_eq!(exec.query(), "SELECT * FROM orders");

        let custom = config_builder(tmp.path())
            .custom_query("SELECT id, customer FROM orders WHERE id > $@$")
            .build()
            .unwrap();
        let exec = PollingExecutor::new(
            &custom,
            MockSession::new(),
            RecordingSink::new(),
            Arc::new(store(tmp.path())),
        )
        .await
        .unwrap();
        assert_eq!(exec.query(), "SELECT id, customer FROM orders WHERE id > $@$");
    }

    #[tokio::test]
    async fn custom_query_binds_cursor_placeholder() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(vec![order(42)]);
        let custom = config_builder(tmp.path())
            .custom_query("SELECT id, customer, note FROM orders WHERE id > $@$ ORDER BY id")
            .build()
            .unwrap();
        let mut exec = PollingExecutor::new(
            &custom,
            session.clone(),
            RecordingSink::new(),
            Arc::new(store(tmp.path())),
        )
        .await
        .unwrap();

        exec.run_cycle(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            session.queries()[0],
            "SELECT id, customer, note FROM orders WHERE id > '0' ORDER BY id"
        );
        assert_eq!(exec.cursor(), &Cursor::new("42"));
    }

    #[tokio::test]
    async fn row_offset_mode_pages_by_count() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(orders(1..=2)).push_rows(orders(3..=3));
        let mut offset_config = config_builder(tmp.path()).max_rows(2).build().unwrap();
        offset_config.incremental_column = None;
        let mut exec = PollingExecutor::new(
            &offset_config,
            session.clone(),
            RecordingSink::new(),
            Arc::new(store(tmp.path())),
        )
        .await
        .unwrap();
        let cancel = CancellationToken::new();

        exec.run_cycle(&cancel).await.unwrap();
        exec.run_cycle(&cancel).await.unwrap();

        assert_eq!(
            session.queries(),
            vec![
                "SELECT * FROM orders LIMIT 2 OFFSET 0".to_string(),
                "SELECT * FROM orders LIMIT 2 OFFSET 2".to_string(),
            ]
        );
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("3"));
    }

    #[tokio::test]
    async fn events_carry_csv_body_and_timestamp() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(vec![order(1)]);
        let sink = RecordingSink::new();
        let piped = config_builder(tmp.path())
            .event_format(EventFormat {
                delimiter: b'|',
                enclose_by_quotes: false,
                ..EventFormat::default()
            })
            .build()
            .unwrap();
        let mut exec = PollingExecutor::new(
            &piped,
            session.clone(),
            sink.clone(),
            Arc::new(store(tmp.path())),
        )
        .await
        .unwrap();

        exec.run_cycle(&CancellationToken::new()).await.unwrap();

        let batch = &sink.batches()[0];
        let event = &batch.events[0];
        assert_eq!(event.body_str(), Some("1|customer-1|"));
        let ts: i64 = event.header(HEADER_TIMESTAMP).unwrap().parse().unwrap();
        assert_eq!(ts, batch.ts.timestamp_millis());
    }

    #[tokio::test]
    async fn json_events_are_keyed_by_column() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(vec![order(7)]);
        let sink = RecordingSink::new();
        let json = config_builder(tmp.path())
            .event_format(EventFormat {
                body: BodyFormat::Json,
                ..EventFormat::default()
            })
            .build()
            .unwrap();
        let mut exec = PollingExecutor::new(
            &json,
            session.clone(),
            sink.clone(),
            Arc::new(store(tmp.path())),
        )
        .await
        .unwrap();

        exec.run_cycle(&CancellationToken::new()).await.unwrap();

        let event = &sink.batches()[0].events[0];
        assert_eq!(
            event.body_str(),
            Some(r#"{"id":7,"customer":"customer-7","note":null}"#)
        );
        assert!(event.header(HEADER_TIMESTAMP).is_some());
        assert_eq!(persisted_cursor(tmp.path()), Cursor::new("7"));
    }

    #[tokio::test]
    async fn rows_without_cursor_value_are_delivered_but_not_committed() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_rows(vec![order(1)]);
        let sink = RecordingSink::new();
        let by_note = config_builder(tmp.path())
            .incremental_column("note")
            .build()
            .unwrap();
        let mut exec = PollingExecutor::new(
            &by_note,
            session.clone(),
            sink.clone(),
            Arc::new(store(tmp.path())),
        )
        .await
        .unwrap();

        let outcome = exec.run_cycle(&CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, CycleOutcome::Delivered { rows: 1, batches: 1 });
        assert_eq!(exec.cursor(), &Cursor::new("0"));
    }

    #[tokio::test]
    async fn repeated_query_failures_degrade_health() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        for _ in 0..3 {
            session.push_error(DbError::Io(std::io::Error::other("connection reset")));
        }
        session.push_rows(orders(1..=1));
        let mut exec = executor(tmp.path(), &session, &RecordingSink::new()).await;
        let health = exec.health();
        let cancel = CancellationToken::new();

        assert!(exec.run_cycle(&cancel).await.is_err());
        assert!(exec.run_cycle(&cancel).await.is_err());
        assert_eq!(*health.borrow(), Health::Starting);

        assert!(exec.run_cycle(&cancel).await.is_err());
        assert!(matches!(
            &*health.borrow(),
            Health::Degraded { consecutive_failures: 3, .. }
        ));
        assert_eq!(exec.metrics().snapshot().failure_count, 3);

        exec.run_cycle(&cancel).await.unwrap();
        assert_eq!(*health.borrow(), Health::Healthy);
    }

    #[tokio::test]
    async fn fatal_query_error_degrades_immediately() {
        let tmp = tempdir().unwrap();
        let session = MockSession::new();
        session.push_error(DbError::Closed);
        let mut exec = executor(tmp.path(), &session, &RecordingSink::new()).await;
        let health = exec.health();

        assert!(exec.run_cycle(&CancellationToken::new()).await.is_err());
        assert!(health.borrow().is_degraded());
    }

    #[tokio::test]
    async fn checkpoint_of_other_source_fails_construction() {
        let tmp = tempdir().unwrap();
        executor(tmp.path(), &MockSession::new(), &RecordingSink::new()).await;

        let other = config_builder(tmp.path()).table("customers").build().unwrap();
        let err = PollingExecutor::new(
            &other,
            MockSession::new(),
            RecordingSink::new(),
            Arc::new(store(tmp.path())),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, PollError::Restore(_)));
    }

    #[tokio::test]
    async fn status_directory_must_be_creatable() {
        let tmp = tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let store = StatusFileStore::new(blocker.join("status"), STATUS_FILE);
        assert!(store.prepare().await.is_err());
    }
}
