//! 이벤트 저장소 구현
//!
//! core의 [`EventStore`] trait에 대한 두 가지 기본 구현을 제공합니다.
//!
//! - [`MemoryStore`]: 용량 제한이 있는 인메모리 저장소. 테스트와 데모,
//!   그리고 기본 설정에서 사용됩니다.
//! - [`JsonlStore`]: append 전용 JSONL 파일 저장소. 외부 문서 데이터베이스로
//!   넘기기 전의 로컬 영속화 형태입니다.
//!
//! 실제 운영 환경의 문서 데이터베이스 연동은 이 trait을 구현하는
//! 별도 크레이트가 담당합니다.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use logwarden_core::error::StoreError;
use logwarden_core::metrics as metric_names;
use logwarden_core::pipeline::EventStore;
use logwarden_core::types::EnrichedEvent;

/// 용량 제한 인메모리 저장소
///
/// 가장 오래된 문서부터 밀려납니다. 문서는 이벤트의 고정 문서 형태
/// (`EnrichedEvent::document()`)로 보관합니다.
pub struct MemoryStore {
    entries: Mutex<VecDeque<(DateTime<Utc>, serde_json::Value)>>,
    capacity: usize,
}

impl MemoryStore {
    /// 지정한 용량의 저장소를 생성합니다.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }

    /// 현재 보관 중인 문서 수
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn lock_entries(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<(DateTime<Utc>, serde_json::Value)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl EventStore for MemoryStore {
    async fn persist(&self, event: &EnrichedEvent) -> Result<(), StoreError> {
        let start = Instant::now();
        {
            let mut entries = self.lock_entries();
            if entries.len() >= self.capacity {
                entries.pop_front();
            }
            entries.push_back((event.timestamp, event.document()));
        }
        counter!(metric_names::STORE_PERSIST_TOTAL, metric_names::LABEL_RESULT => "success")
            .increment(1);
        histogram!(metric_names::STORE_PERSIST_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<serde_json::Value>, StoreError> {
        let mut entries: Vec<(DateTime<Utc>, serde_json::Value)> =
            self.lock_entries().iter().cloned().collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries
            .into_iter()
            .take(limit)
            .map(|(_, doc)| doc)
            .collect())
    }
}

/// Append 전용 JSONL 파일 저장소
///
/// 이벤트 하나당 한 줄의 JSON 문서를 파일 끝에 덧붙입니다.
pub struct JsonlStore {
    path: PathBuf,
    // append 쓰기 순서를 보장하기 위한 비동기 락
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlStore {
    /// 지정한 경로의 저장소를 생성합니다. 파일은 첫 쓰기에 생성됩니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// 저장 파일 경로
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl EventStore for JsonlStore {
    async fn persist(&self, event: &EnrichedEvent) -> Result<(), StoreError> {
        let start = Instant::now();
        let mut line = serde_json::to_string(&event.document())
            .map_err(|e| StoreError::Persist(e.to_string()))?;
        line.push('\n');

        let result = async {
            let _guard = self.write_lock.lock().await;
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                counter!(metric_names::STORE_PERSIST_TOTAL, metric_names::LABEL_RESULT => "success")
                    .increment(1);
                histogram!(metric_names::STORE_PERSIST_DURATION_SECONDS)
                    .record(start.elapsed().as_secs_f64());
                debug!(path = %self.path.display(), event_id = %event.id, "event appended");
                Ok(())
            }
            Err(e) => {
                counter!(metric_names::STORE_PERSIST_TOTAL, metric_names::LABEL_RESULT => "failure")
                    .increment(1);
                Err(StoreError::Io(e))
            }
        }
    }

    async fn recent(&self, limit: usize) -> Result<Vec<serde_json::Value>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            // 아직 아무것도 쓰지 않은 저장소는 빈 결과
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut documents: Vec<serde_json::Value> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()
            .map_err(|e| StoreError::Query(e.to_string()))?;

        // 문서의 timestamp는 항상 UTC RFC 3339라 문자열 비교가 시간 순서와 일치
        documents.sort_by(|a, b| {
            let ta = a.get("timestamp").and_then(|v| v.as_str()).unwrap_or("");
            let tb = b.get("timestamp").and_then(|v| v.as_str()).unwrap_or("");
            tb.cmp(ta)
        });
        documents.truncate(limit);
        Ok(documents)
    }
}
