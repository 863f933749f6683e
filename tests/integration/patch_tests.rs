//! Patch application against a real git working tree
//!
//! Skipped when no `git` binary is available.

#[cfg(test)]
mod tests {
    use crate::common::GitScratch;
    use lexflow::config::VcsConfig;
    use lexflow::core::models::*;
    use lexflow::core::patch::PatchEngine;
    use lexflow::storage::MemoryRepository;
    use lexflow::storage::counters::MemoryCounterStore;
    use lexflow::vcs::{GitCli, GitProvider, VcsClient};
    use std::sync::Arc;

    const STRINGS: &str = "title = \"标题\"\ngreeting = \"你好\"\n";

    struct Seeded {
        repository: Arc<MemoryRepository>,
        reviews: Vec<OccurrenceReview>,
    }

    fn seed(scratch: &GitScratch) -> Seeded {
        let repository = Arc::new(MemoryRepository::new());
        let repo = repository
            .create_repository("web", &scratch.path().to_string_lossy())
            .unwrap();
        let file = repository.create_source_file(repo.id, "strings.py").unwrap();

        let mut reviews = Vec::new();
        for (line_at, start, end, matched, replacement) in [
            (1, 8, 12, "\"标题\"", "\"Title\""),
            (2, 11, 15, "\"你好\"", "\"hello\""),
        ] {
            let occurrence = repository
                .create_occurrence(NewOccurrence {
                    lexeme_id: 1,
                    file_id: file.id,
                    line_at,
                    start,
                    end,
                    matched_text: matched.to_string(),
                })
                .unwrap();
            reviews.push(
                repository
                    .create_review(occurrence.id, Some(replacement))
                    .unwrap(),
            );
        }
        Seeded {
            repository,
            reviews,
        }
    }

    fn engine(repository: Arc<MemoryRepository>) -> PatchEngine {
        let config = VcsConfig {
            author_name: Some("lexflow".to_string()),
            author_email: Some("lexflow@example.com".to_string()),
            ..VcsConfig::default()
        };
        PatchEngine::new(
            repository,
            Arc::new(GitProvider::new(config.clone())),
            Arc::new(MemoryCounterStore::new()),
            &config,
        )
    }

    #[tokio::test]
    async fn test_file_commits_once_all_reviews_apply() {
        let Some(scratch) = GitScratch::new(&[("strings.py", STRINGS), ("other.py", "x = 1\n")])
        else {
            return;
        };
        let seeded = seed(&scratch);
        let engine = engine(seeded.repository.clone());
        let head_before = scratch.git(&["rev-parse", "HEAD"]);

        let first = engine.apply(seeded.reviews[0].id).await.unwrap();
        assert!(first.success, "{:?}", first);
        assert!(!first.committed);
        assert_eq!(scratch.git(&["rev-parse", "HEAD"]), head_before);

        // an unrelated edit must not ride along in the commit
        scratch.write("other.py", "x = 2\n");

        let second = engine.apply(seeded.reviews[1].id).await.unwrap();
        assert!(second.committed, "{:?}", second);
        assert_eq!(
            scratch.read("strings.py"),
            "title = \"Title\"\ngreeting = \"hello\"\n"
        );

        let message = scratch.git(&["log", "-1", "--format=%B"]);
        assert!(message.contains("strings.py"));
        assert!(message.contains("web"));
        for review in &seeded.reviews {
            assert!(message.contains(&review.id.to_string()));
        }
        assert_eq!(
            scratch.git(&["log", "-1", "--format=%an"]),
            "lexflow"
        );
        let changed = scratch.git(&["show", "--name-only", "--format=", "HEAD"]);
        assert_eq!(changed, "strings.py");
        assert_eq!(scratch.git(&["status", "--porcelain"]), "M other.py");

        let git = GitCli::new(scratch.path(), &VcsConfig::default());
        let sha = scratch.git(&["rev-parse", "HEAD:strings.py"]);
        let blob = git.read_blob(&sha).await.unwrap();
        assert_eq!(String::from_utf8(blob).unwrap(), scratch.read("strings.py"));
    }

    #[tokio::test]
    async fn test_conflict_leaves_file_and_history_alone() {
        let Some(scratch) = GitScratch::new(&[("strings.py", STRINGS)]) else {
            return;
        };
        let seeded = seed(&scratch);
        let engine = engine(seeded.repository.clone());
        scratch.write("strings.py", "title = \"标题\"\ngreeting = \"hi\"\n");
        let head_before = scratch.git(&["rev-parse", "HEAD"]);

        let report = engine.apply(seeded.reviews[1].id).await.unwrap();

        assert!(!report.success);
        assert_eq!(report.apply_status, Some(ApplyStatus::Conflict));
        assert_eq!(
            scratch.read("strings.py"),
            "title = \"标题\"\ngreeting = \"hi\"\n"
        );
        assert_eq!(scratch.git(&["rev-parse", "HEAD"]), head_before);
        assert_eq!(
            seeded
                .repository
                .review(seeded.reviews[1].id)
                .unwrap()
                .apply_status,
            ApplyStatus::Conflict
        );
    }

    #[tokio::test]
    async fn test_pending_changes_tracks_path() {
        let Some(scratch) = GitScratch::new(&[("strings.py", STRINGS)]) else {
            return;
        };
        let git = GitCli::new(scratch.path(), &VcsConfig::default());

        assert!(!git.has_pending_changes("strings.py").await.unwrap());
        scratch.write("strings.py", "changed\n");
        assert!(git.has_pending_changes("strings.py").await.unwrap());
        git.stage("strings.py").await.unwrap();
        assert!(git.has_pending_changes("strings.py").await.unwrap());
    }
}
