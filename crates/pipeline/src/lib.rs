#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: BSD syslog, Apache, nginx, JSON 매처 및 자동 감지 라우터
//! - [`features`]: 원문 기반 수치 특징 추출
//! - [`model`]: 위협 모델 아티팩트 로딩과 검증
//! - [`classifier`]: 2단계 분류 (이상 판정 + 위협 유형 argmax)
//! - [`broadcast`]: 구독자 방송 허브
//! - [`store`]: 이벤트 저장소 구현 (메모리, JSONL)
//! - [`orchestrator`]: 수집 경로 조율
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! RawLogLine -> FormatRouter -> FeatureExtractor -> Classifier
//!                                                       |
//!                               EnrichedEvent <---------+
//!                                |           \
//!                            EventStore    BroadcastHub -> subscribers
//!                           (persist 먼저, 성공 시에만 방송)
//! ```

pub mod broadcast;
pub mod classifier;
pub mod error;
pub mod features;
pub mod model;
pub mod orchestrator;
pub mod parser;
pub mod store;

// --- 주요 타입 re-export ---

// 오케스트레이터
pub use orchestrator::{
    BatchReport, IngestOutcome, IngestStats, IngestionOrchestrator, OrchestratorBuilder,
};

// 파서
pub use parser::{ApacheMatcher, FormatRouter, JsonMatcher, NginxMatcher, SyslogMatcher};

// 특징 추출
pub use features::{FEATURE_COUNT, FEATURE_SCHEMA_VERSION, FeatureExtractor, FeatureVector};

// 분류
pub use classifier::Classifier;
pub use model::{LinearStage, ThreatModel, ThreatStage};

// 방송
pub use broadcast::{BroadcastHub, PublishReport, SubscriberId};

// 저장소
pub use store::{JsonlStore, MemoryStore};

// 에러
pub use error::IngestError;
