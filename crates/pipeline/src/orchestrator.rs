//! 수집 오케스트레이터
//!
//! 원시 로그 라인 하나가 파싱, 특징 추출, 분류, 영속화, 방송을 거쳐
//! 보강된 이벤트로 끝나는 전 과정을 조율합니다.
//!
//! # 처리 순서
//! 1. 공백 라인 거부 (부수효과 없음)
//! 2. 형식 라우팅 (실패 없음, 미인식은 degraded 수락)
//! 3. 특징 추출, 분류 (실패 시 폴백 판정)
//! 4. 이벤트 생성 (불변)
//! 5. 영속화. 실패하면 에러 반환, 방송 없음
//! 6. 방송, 수락 응답
//!
//! 수락된 라인 하나당 정확히 한 번의 영속화와 한 번의 발행이 일어납니다.
//! 재시도와 중복 제거는 없습니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, histogram};
use tracing::{debug, error, info};

use logwarden_core::metrics as metric_names;
use logwarden_core::pipeline::EventStore;
use logwarden_core::types::{EnrichedEvent, RawLogLine, SourceFormat, ThreatType};

use crate::broadcast::BroadcastHub;
use crate::classifier::Classifier;
use crate::error::IngestError;
use crate::features::FeatureExtractor;
use crate::parser::FormatRouter;

/// 단일 라인 수집 결과
#[derive(Debug)]
pub enum IngestOutcome {
    /// 수집 완료. 영속화와 방송까지 끝난 이벤트입니다.
    Accepted(EnrichedEvent),
    /// 처리 전 거부. 어떤 부수효과도 일어나지 않았습니다.
    Rejected {
        /// 거부 사유
        reason: String,
    },
}

/// 배치 수집 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 파이프라인에 제출된 비공백 라인 수
    pub submitted: usize,
    /// 수락된 라인 수
    pub accepted: usize,
    /// 거부된 라인 수
    pub rejected: usize,
    /// 건너뛴 공백 라인 수
    pub skipped: usize,
}

/// 누적 카운터 스냅샷
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected: u64,
    pub unrecognized: u64,
    pub classifier_fallbacks: u64,
    pub store_failures: u64,
}

#[derive(Default)]
struct Counters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    unrecognized: AtomicU64,
    classifier_fallbacks: AtomicU64,
    store_failures: AtomicU64,
}

/// 수집 오케스트레이터
///
/// 저장소 타입에 제네릭이라 테스트에서는 [`MemoryStore`](crate::store::MemoryStore),
/// 운영에서는 설정된 백엔드가 정적 디스패치로 꽂힙니다.
pub struct IngestionOrchestrator<S: EventStore> {
    router: FormatRouter,
    extractor: FeatureExtractor,
    classifier: Classifier,
    hub: Arc<BroadcastHub>,
    store: S,
    max_line_bytes: usize,
    counters: Counters,
}

impl<S: EventStore> IngestionOrchestrator<S> {
    /// 빌더를 시작합니다.
    pub fn builder(store: S) -> OrchestratorBuilder<S> {
        OrchestratorBuilder::new(store)
    }

    /// 방송 허브 핸들을 반환합니다. 구독자 등록에 사용합니다.
    pub fn hub(&self) -> Arc<BroadcastHub> {
        Arc::clone(&self.hub)
    }

    /// 저장소 참조를 반환합니다. 최근 이벤트 조회에 사용합니다.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 누적 카운터의 스냅샷을 반환합니다.
    pub fn stats(&self) -> IngestStats {
        IngestStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            unrecognized: self.counters.unrecognized.load(Ordering::Relaxed),
            classifier_fallbacks: self.counters.classifier_fallbacks.load(Ordering::Relaxed),
            store_failures: self.counters.store_failures.load(Ordering::Relaxed),
        }
    }

    /// 원시 로그 라인 하나를 수집합니다.
    ///
    /// 저장소 실패만 에러로 전파됩니다. 그 이벤트는 방송되지 않으며
    /// 프로세스는 계속 동작합니다.
    pub async fn ingest(&self, line: RawLogLine) -> Result<IngestOutcome, IngestError> {
        let start = Instant::now();
        counter!(metric_names::INGEST_LINES_TOTAL).increment(1);

        // 1. 부수효과 이전의 거부 검사
        if line.raw.trim().is_empty() {
            return Ok(self.reject("blank line"));
        }
        if line.raw.len() > self.max_line_bytes {
            return Ok(self.reject(&format!(
                "line exceeds {} bytes (got {})",
                self.max_line_bytes,
                line.raw.len()
            )));
        }

        // 2. 형식 라우팅 (실패 없음)
        let record = self.router.parse(&line.raw);
        if record.source == SourceFormat::Unrecognized {
            self.counters.unrecognized.fetch_add(1, Ordering::Relaxed);
            counter!(metric_names::PARSER_UNRECOGNIZED_TOTAL).increment(1);
        } else {
            counter!(metric_names::PARSER_PARSED_TOTAL,
                metric_names::LABEL_FORMAT => record.source.to_string())
            .increment(1);
        }

        // 3. 특징 추출과 분류
        let features = self.extractor.extract(&record);
        let classification = self.classifier.classify(&features);
        if classification.threat_type == ThreatType::Unknown {
            self.counters
                .classifier_fallbacks
                .fetch_add(1, Ordering::Relaxed);
            counter!(metric_names::CLASSIFIER_FALLBACKS_TOTAL).increment(1);
        }
        counter!(metric_names::CLASSIFIER_RESULTS_TOTAL,
            metric_names::LABEL_LABEL => classification.label.to_string(),
            metric_names::LABEL_THREAT_TYPE => classification.threat_type.to_string())
        .increment(1);

        // 4. 이벤트 생성
        let event = EnrichedEvent::new(record, classification, line.timestamp, Utc::now());

        // 5. 영속화. 실패하면 방송 없이 에러 반환
        if let Err(e) = self.store.persist(&event).await {
            self.counters.store_failures.fetch_add(1, Ordering::Relaxed);
            error!(event_id = %event.id, error = %e, "persist failed, event not broadcast");
            return Err(IngestError::Store(e));
        }

        // 6. 방송
        let report = self.hub.publish(&event);
        self.counters.accepted.fetch_add(1, Ordering::Relaxed);
        counter!(metric_names::INGEST_EVENTS_ACCEPTED_TOTAL).increment(1);
        histogram!(metric_names::INGEST_PROCESSING_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        debug!(
            event_id = %event.id,
            source = %event.record.source,
            classification = %event.classification,
            delivered = report.delivered,
            "line ingested"
        );

        Ok(IngestOutcome::Accepted(event))
    }

    /// 여러 줄 본문을 라인 단위로 수집합니다.
    ///
    /// 공백 라인은 부수효과 없이 건너뜁니다. 라인 단위 degraded 처리
    /// (미인식 형식, 폴백 판정)는 배치를 중단시키지 않습니다. 저장소
    /// 실패만 남은 라인 처리를 중단하고 에러로 전파됩니다.
    pub async fn ingest_batch(&self, body: &str) -> Result<BatchReport, IngestError> {
        let mut report = BatchReport::default();

        for line in body.lines() {
            if line.trim().is_empty() {
                report.skipped += 1;
                continue;
            }
            report.submitted += 1;
            match self.ingest(RawLogLine::new(line)).await? {
                IngestOutcome::Accepted(_) => report.accepted += 1,
                IngestOutcome::Rejected { .. } => report.rejected += 1,
            }
        }

        info!(
            submitted = report.submitted,
            accepted = report.accepted,
            rejected = report.rejected,
            skipped = report.skipped,
            "batch ingested"
        );
        Ok(report)
    }

    fn reject(&self, reason: &str) -> IngestOutcome {
        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        counter!(metric_names::INGEST_LINES_REJECTED_TOTAL).increment(1);
        debug!(reason, "line rejected");
        IngestOutcome::Rejected {
            reason: reason.to_owned(),
        }
    }
}

/// 오케스트레이터 빌더
///
/// 저장소만 필수이고 나머지 협력자는 기본 구성으로 채워집니다.
pub struct OrchestratorBuilder<S: EventStore> {
    store: S,
    router: Option<FormatRouter>,
    classifier: Option<Classifier>,
    hub: Option<Arc<BroadcastHub>>,
    max_line_bytes: usize,
}

impl<S: EventStore> OrchestratorBuilder<S> {
    /// 지정한 저장소로 빌더를 생성합니다.
    pub fn new(store: S) -> Self {
        Self {
            store,
            router: None,
            classifier: None,
            hub: None,
            max_line_bytes: 64 * 1024,
        }
    }

    /// 형식 라우터를 교체합니다. 기본은 전체 매처 세트입니다.
    pub fn router(mut self, router: FormatRouter) -> Self {
        self.router = Some(router);
        self
    }

    /// 분류기를 설정합니다. 기본은 내장 모델입니다.
    pub fn classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// 방송 허브를 공유합니다. 기본은 새 허브입니다.
    pub fn hub(mut self, hub: Arc<BroadcastHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    /// 단일 라인 최대 크기를 설정합니다.
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.max_line_bytes = bytes;
        self
    }

    /// 구성을 검증하고 오케스트레이터를 생성합니다.
    pub fn build(self) -> Result<IngestionOrchestrator<S>, IngestError> {
        if self.max_line_bytes == 0 {
            return Err(IngestError::InvalidConfig {
                reason: "max_line_bytes must be greater than 0".to_owned(),
            });
        }

        Ok(IngestionOrchestrator {
            router: self.router.unwrap_or_default(),
            extractor: FeatureExtractor::new(),
            classifier: self.classifier.unwrap_or_else(Classifier::with_builtin),
            hub: self.hub.unwrap_or_default(),
            store: self.store,
            max_line_bytes: self.max_line_bytes,
            counters: Counters::default(),
        })
    }
}
