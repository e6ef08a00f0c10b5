//! `InMemoryTaskStore`: the bundled `Persistence` implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use subtitle_core::{
    EntryUpdate, FileType, HistoryEntry, NewTaskMeta, Persistence, PipelineError, Result,
    SubtitleEntry, Task, TranslationProgress,
};

struct Inner {
    tasks: HashMap<String, Task>,
    history: Vec<HistoryEntry>,
}

/// A `parking_lot::RwLock`-backed store, grounded in the teacher's
/// trait-plus-concrete-store pattern (`AppointmentStore` /
/// `ScyllaAppointmentStore`) but without an external database — no durable
/// backend is in scope for this crate (§1).
pub struct InMemoryTaskStore {
    inner: RwLock<Inner>,
    next_task_id: AtomicU64,
}

impl InMemoryTaskStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(Inner {
                tasks: HashMap::new(),
                history: Vec::new(),
            }),
            next_task_id: AtomicU64::new(1),
        })
    }

    fn generate_task_id(&self) -> String {
        let n = self.next_task_id.fetch_add(1, Ordering::SeqCst);
        format!("task-{n}")
    }

    fn apply_update(entry: &mut SubtitleEntry, update: &EntryUpdate) {
        if let Some(text) = &update.text {
            entry.text = text.clone();
        }
        if let Some(translated) = &update.translated_text {
            entry.translated_text = Some(translated.clone());
        }
        if let Some(status) = update.status {
            entry.translation_status = status;
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                tasks: HashMap::new(),
                history: Vec::new(),
            }),
            next_task_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl Persistence for InMemoryTaskStore {
    async fn create_task(
        &self,
        filename: &str,
        entries: Vec<SubtitleEntry>,
        _index: usize,
        meta: NewTaskMeta,
    ) -> Result<String> {
        let task_id = self.generate_task_id();
        let total = entries.len() as u32;
        let task = Task {
            task_id: task_id.clone(),
            filename: filename.to_string(),
            subtitle_entries: entries,
            translation_progress: TranslationProgress {
                completed: 0,
                total,
                tokens: 0,
            },
            file_type: meta.file_type,
            duration: meta.duration,
        };
        tracing::info!(task_id = %task_id, file_type = ?task.file_type, "task created");
        self.inner.write().tasks.insert(task_id.clone(), task);
        Ok(task_id)
    }

    async fn update_entry(&self, task_id: &str, update: EntryUpdate) -> Result<()> {
        let mut guard = self.inner.write();
        let task = guard
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| PipelineError::Persistence(format!("unknown task {task_id}")))?;
        let entry = task
            .subtitle_entries
            .iter_mut()
            .find(|e| e.id == update.entry_id)
            .ok_or_else(|| {
                PipelineError::Persistence(format!(
                    "unknown entry {} in task {task_id}",
                    update.entry_id
                ))
            })?;
        Self::apply_update(entry, &update);
        Ok(())
    }

    async fn batch_update_entries(&self, task_id: &str, updates: Vec<EntryUpdate>) -> Result<()> {
        let mut guard = self.inner.write();
        let task = guard
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| PipelineError::Persistence(format!("unknown task {task_id}")))?;
        for update in &updates {
            if let Some(entry) = task
                .subtitle_entries
                .iter_mut()
                .find(|e| e.id == update.entry_id)
            {
                Self::apply_update(entry, update);
            }
        }
        Ok(())
    }

    async fn update_progress(
        &self,
        task_id: &str,
        update: subtitle_core::ProgressUpdate,
    ) -> Result<()> {
        let mut guard = self.inner.write();
        let task = guard
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| PipelineError::Persistence(format!("unknown task {task_id}")))?;
        if let Some(completed) = update.completed {
            task.translation_progress.completed = completed;
        }
        if let Some(total) = update.total {
            task.translation_progress.total = total;
        }
        if let Some(tokens) = update.tokens {
            task.translation_progress.tokens = tokens;
        }
        Ok(())
    }

    async fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        Ok(self.inner.read().tasks.get(task_id).cloned())
    }

    async fn clear_task(&self, task_id: &str) -> Result<()> {
        self.inner.write().tasks.remove(task_id);
        Ok(())
    }

    async fn append_history_entry(&self, entry: HistoryEntry) -> Result<()> {
        tracing::info!(task_id = %entry.task_id, "history entry appended");
        self.inner.write().history.push(entry);
        Ok(())
    }
}
