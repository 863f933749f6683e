//! Seed data and scratch repositories

use lexflow::config::{PipelineSettings, ProcessorConfig, QueueConfig};
use lexflow::core::pipeline::Pipeline;
use lexflow::core::processor::ProcessorRegistry;
use lexflow::storage::WorkItemRepository;
use lexflow::storage::broadcast::LocalBroadcaster;
use lexflow::storage::counters::MemoryCounterStore;
use lexflow::storage::queue::{LocalJobQueue, TaskRunner};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

/// Pipeline over `repository` with in-process counters, queue and broadcast
pub struct LocalPipeline {
    pub pipeline: Pipeline,
    pub queue: Arc<LocalJobQueue>,
    pub counters: Arc<MemoryCounterStore>,
    pub broadcaster: Arc<LocalBroadcaster>,
}

impl LocalPipeline {
    pub async fn drain(&self) -> usize {
        let config = QueueConfig {
            concurrency: 4,
            retry_delay_ms: 1,
            ..QueueConfig::default()
        };
        TaskRunner::new(
            self.queue.clone(),
            Arc::new(self.pipeline.clone()),
            &config,
        )
        .run_until_idle()
        .await
        .expect("task runner failed")
    }
}

pub fn local_pipeline(
    repository: Arc<dyn WorkItemRepository>,
    max_tokens_per_batch: usize,
) -> LocalPipeline {
    let queue = Arc::new(LocalJobQueue::new());
    let counters = Arc::new(MemoryCounterStore::new());
    let broadcaster = Arc::new(LocalBroadcaster::new(256));
    let processors = ProcessorRegistry::from_configs(&[
        ProcessorConfig::new("dry-run", "identity"),
        ProcessorConfig::new("tagged", "identity")
            .with_settings(serde_json::json!({ "prefix": "[en] " })),
    ]);
    let settings = PipelineSettings {
        max_tokens_per_batch,
        page_size: 4,
        ..PipelineSettings::default()
    };
    let pipeline = Pipeline::new(
        repository,
        counters.clone(),
        queue.clone(),
        broadcaster.clone(),
        Arc::new(processors),
        settings,
    );
    LocalPipeline {
        pipeline,
        queue,
        counters,
        broadcaster,
    }
}

/// A throwaway git repository with one commit
pub struct GitScratch {
    pub dir: TempDir,
}

impl GitScratch {
    /// `None` when no usable git binary is installed
    pub fn new(files: &[(&str, &str)]) -> Option<Self> {
        let available = Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);
        if !available {
            eprintln!("Skipping test: git not available");
            return None;
        }

        let scratch = Self {
            dir: tempfile::tempdir().ok()?,
        };
        scratch.git(&["init", "--quiet"]);
        scratch.git(&["config", "user.name", "Fixture"]);
        scratch.git(&["config", "user.email", "fixture@example.com"]);
        scratch.git(&["config", "commit.gpgsign", "false"]);
        for (path, content) in files {
            scratch.write(path, content);
        }
        scratch.git(&["add", "--all"]);
        scratch.git(&["commit", "--quiet", "-m", "initial"]);
        Some(scratch)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &str) {
        std::fs::write(self.path().join(path), content).expect("write fixture file");
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("read fixture file")
    }

    /// Run git and return trimmed stdout, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("spawn git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}
