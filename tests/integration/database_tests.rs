//! Database integration tests
//!
//! Repository operations against an in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use lexflow::core::models::*;
    use lexflow::storage::{ReviewRepository, WorkItemRepository};

    async fn seed(db: &TestDatabase, texts: &[&str]) -> Vec<i64> {
        let mut ids = Vec::new();
        for text in texts {
            ids.push(db.db().upsert_lexeme(NewLexeme::new(*text)).await.unwrap().id);
        }
        ids
    }

    #[tokio::test]
    async fn test_database_health_check() {
        let db = TestDatabase::new().await;
        tokio_test::assert_ok!(db.db().health_check().await);
    }

    #[tokio::test]
    async fn test_upsert_lexeme_keeps_first_row() {
        let db = TestDatabase::new().await;
        let first = db.db().upsert_lexeme(NewLexeme::new("保存")).await.unwrap();
        let again = db.db().upsert_lexeme(NewLexeme::new(" 保存  ")).await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(first.status, LexemeStatus::Pending);
        assert_eq!(first.fingerprint, Lexeme::fingerprint("保存"));
    }

    #[tokio::test]
    async fn test_scan_pages_by_id() {
        let db = TestDatabase::new().await;
        let ids = seed(&db, &["a", "b", "c", "d", "e"]).await;

        let first = db
            .db()
            .scan_lexemes(LexemeStatus::Pending, None, 2)
            .await
            .unwrap();
        let second = db
            .db()
            .scan_lexemes(LexemeStatus::Pending, first.last().map(|l| l.id), 2)
            .await
            .unwrap();
        let third = db
            .db()
            .scan_lexemes(LexemeStatus::Pending, second.last().map(|l| l.id), 2)
            .await
            .unwrap();

        let scanned: Vec<i64> = first
            .iter()
            .chain(&second)
            .chain(&third)
            .map(|lexeme| lexeme.id)
            .collect();
        assert_eq!(scanned, ids);
        assert_eq!(third.len(), 1);
    }

    #[tokio::test]
    async fn test_transition_is_an_exclusive_claim() {
        let db = TestDatabase::new().await;
        let ids = seed(&db, &["a", "b", "c"]).await;

        let won = db
            .db()
            .transition_lexemes(&ids[..2], LexemeStatus::Pending, LexemeStatus::Processing)
            .await
            .unwrap();
        assert_eq!(won.len(), 2);

        // overlapping claim only gets the row nobody holds
        let mut second = db
            .db()
            .transition_lexemes(&ids, LexemeStatus::Pending, LexemeStatus::Processing)
            .await
            .unwrap();
        second.sort_unstable();
        assert_eq!(second, vec![ids[2]]);

        let done = db
            .db()
            .transition_lexemes(&ids[..1], LexemeStatus::Processing, LexemeStatus::Succeeded)
            .await
            .unwrap();
        assert_eq!(done, vec![ids[0]]);
        let loaded = db.db().load_lexemes(&ids[..1]).await.unwrap();
        assert!(loaded[0].processed_at.is_some());
    }

    #[tokio::test]
    async fn test_result_upsert_overwrites() {
        let db = TestDatabase::new().await;
        let ids = seed(&db, &["a"]).await;
        let run = db.db().create_run("dry-run").await.unwrap();

        for text in ["first", "second"] {
            db.db()
                .upsert_result(
                    run.id,
                    &ProcessOutput {
                        lexeme_id: ids[0],
                        output: serde_json::json!(text),
                        metadata: serde_json::json!({}),
                    },
                )
                .await
                .unwrap();
        }

        let results = db.db().results_for_run(run.id).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].output, serde_json::json!("second"));
    }

    #[tokio::test]
    async fn test_run_status_is_monotonic() {
        let db = TestDatabase::new().await;
        let run = db.db().create_run("dry-run").await.unwrap();
        assert_eq!(run.status, RunStatus::Pending);

        assert!(db.db().start_run(run.id).await.unwrap());
        assert!(!db.db().start_run(run.id).await.unwrap());

        let payload = serde_json::json!({ "total": 0 });
        assert!(db.db().close_run(run.id, RunStatus::Done, &payload).await.unwrap());
        assert!(!db.db().close_run(run.id, RunStatus::Failed, &payload).await.unwrap());
        assert!(!db.db().fail_run(run.id, "late").await.unwrap());

        let closed = db.db().get_run(run.id).await.unwrap().unwrap();
        assert_eq!(closed.status, RunStatus::Done);
        assert_eq!(closed.final_progress, Some(payload));
        assert!(closed.finished_at.is_some());
        assert!(closed.error.is_none());
    }

    #[tokio::test]
    async fn test_soft_deleted_run_is_missing() {
        let db = TestDatabase::new().await;
        let run = db.db().create_run("dry-run").await.unwrap();

        assert!(db.db().soft_delete_run(run.id).await.unwrap());
        assert!(db.db().get_run(run.id).await.unwrap().is_none());
        assert!(!db.db().start_run(run.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_review_context_and_file_listing() {
        let db = TestDatabase::new().await;
        let ids = seed(&db, &["你好"]).await;
        let repo = db.db().create_repository("web", "/srv/web").await.unwrap();
        let file = db.db().create_source_file(repo.id, "app/strings.py").await.unwrap();
        let other = db.db().create_source_file(repo.id, "app/other.py").await.unwrap();

        let mut reviews = Vec::new();
        for (file_id, line_at) in [(file.id, 1), (file.id, 2), (other.id, 1)] {
            let occurrence = db
                .db()
                .create_occurrence(NewOccurrence {
                    lexeme_id: ids[0],
                    file_id,
                    line_at,
                    start: 11,
                    end: 15,
                    matched_text: "\"你好\"".to_string(),
                })
                .await
                .unwrap();
            reviews.push(
                db.db()
                    .create_review(occurrence.id, Some("\"hello\""))
                    .await
                    .unwrap(),
            );
        }

        let context = db.db().review_context(reviews[0].id).await.unwrap().unwrap();
        assert_eq!(context.repository.unwrap().name, "web");
        assert_eq!(context.file.unwrap().path, "app/strings.py");
        let occurrence = context.occurrence.unwrap();
        assert_eq!((occurrence.line_at, occurrence.start, occurrence.end), (1, 11, 15));
        assert_eq!(context.review.apply_status, ApplyStatus::NotApplied);

        let in_file = db.db().reviews_for_file(file.id).await.unwrap();
        assert_eq!(
            in_file.iter().map(|review| review.id).collect::<Vec<_>>(),
            vec![reviews[0].id, reviews[1].id]
        );

        db.db()
            .set_apply_status(reviews[0].id, ApplyStatus::Applied, None)
            .await
            .unwrap();
        db.db()
            .set_review_status(reviews[0].id, ReviewStatus::Approved)
            .await
            .unwrap();
        let context = db.db().review_context(reviews[0].id).await.unwrap().unwrap();
        assert_eq!(context.review.status, ReviewStatus::Approved);
        assert_eq!(context.review.apply_status, ApplyStatus::Applied);
        assert!(context.review.applied_at.is_some());

        assert!(db.db().review_context(9999).await.unwrap().is_none());
        assert!(
            db.db()
                .set_review_status(9999, ReviewStatus::Approved)
                .await
                .is_err()
        );
    }
}
