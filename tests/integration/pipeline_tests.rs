//! Pipeline runs end to end over SQLite and the in-process backends

#[cfg(test)]
mod tests {
    use crate::common::{TestDatabase, local_pipeline};
    use lexflow::core::models::*;
    use lexflow::core::pipeline::{Counter, RunKeys};
    use lexflow::storage::WorkItemRepository;
    use lexflow::storage::broadcast::EventKind;
    use lexflow::storage::counters::CounterStore;

    const TEXTS: [&str; 7] = ["文件", "编辑", "视图", "帮助", "保存", "另存为", "退出"];

    #[tokio::test]
    async fn test_run_processes_every_pending_lexeme() {
        let db = TestDatabase::new().await;
        for text in TEXTS {
            db.db().upsert_lexeme(NewLexeme::new(text)).await.unwrap();
        }
        let local = local_pipeline(db.db_arc(), 4);
        let mut events = local.broadcaster.subscribe();

        let run = local.pipeline.submit("tagged").await.unwrap();
        let executed = local.drain().await;
        assert!(executed >= 3, "dispatch, batches and finalize: {}", executed);

        let run = db.db().get_run(run.id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Done);
        let payload: ProgressPayload =
            serde_json::from_value(run.final_progress.clone().unwrap()).unwrap();
        assert_eq!(payload.total, 7);
        assert_eq!(payload.succeeded, 7);
        assert_eq!(payload.percent, 100.0);
        assert_eq!(payload.batches_done, payload.batches_total);

        let results = db.db().results_for_run(run.id).await.unwrap();
        assert_eq!(results.len(), 7);
        assert!(
            results
                .iter()
                .all(|result| result.output.as_str().unwrap().starts_with("[en] "))
        );

        let pending = db
            .db()
            .scan_lexemes(LexemeStatus::Pending, None, 100)
            .await
            .unwrap();
        assert!(pending.is_empty());

        let mut finals = 0;
        while let Ok((channel, event)) = events.try_recv() {
            assert_eq!(channel, RunKeys::new(run.id).channel());
            if event.kind == EventKind::Final {
                finals += 1;
                assert_eq!(event.payload, payload);
            }
        }
        assert_eq!(finals, 1);
    }

    #[tokio::test]
    async fn test_second_run_sees_only_new_lexemes() {
        let db = TestDatabase::new().await;
        db.db().upsert_lexeme(NewLexeme::new("文件")).await.unwrap();
        let local = local_pipeline(db.db_arc(), 100);

        let first = local.pipeline.submit("dry-run").await.unwrap();
        local.drain().await;

        db.db().upsert_lexeme(NewLexeme::new("文件")).await.unwrap();
        db.db().upsert_lexeme(NewLexeme::new("编辑")).await.unwrap();
        let second = local.pipeline.submit("dry-run").await.unwrap();
        local.drain().await;

        let first = local.pipeline.snapshot(first.id).await.unwrap().unwrap();
        let second = local.pipeline.snapshot(second.id).await.unwrap().unwrap();
        assert_eq!(first.total, 1);
        assert_eq!(second.total, 1);
        assert_eq!(second.succeeded, 1);
    }

    #[tokio::test]
    async fn test_unknown_processor_fails_run_cleanly() {
        let db = TestDatabase::new().await;
        db.db().upsert_lexeme(NewLexeme::new("文件")).await.unwrap();
        let local = local_pipeline(db.db_arc(), 100);

        let run = local.pipeline.submit("nonexistent").await.unwrap();
        local.drain().await;

        let run = db.db().get_run(run.id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.error.unwrap().contains("nonexistent"));

        // the lexeme is still available to a later run
        let pending = db
            .db()
            .scan_lexemes(LexemeStatus::Pending, None, 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_run_closes_done() {
        let db = TestDatabase::new().await;
        let local = local_pipeline(db.db_arc(), 100);

        let run = local.pipeline.submit("dry-run").await.unwrap();
        local.drain().await;

        let run = db.db().get_run(run.id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Done);
        let keys = RunKeys::new(run.id);
        assert_eq!(
            local.counters.read(&keys.counter(Counter::Total)).await.unwrap(),
            Some(0)
        );
    }
}
