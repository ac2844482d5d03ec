//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logwarden_`
//! - 모듈명: `ingest_`, `parser_`, `classifier_`, `broadcast_`, `store_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logwarden_core::metrics::INGEST_LINES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 소스 형식 레이블 키 (syslog, apache, nginx, json, unrecognized)
pub const LABEL_FORMAT: &str = "format";

/// 분류 결과 레이블 키 (normal, anomaly)
pub const LABEL_LABEL: &str = "label";

/// 위협 유형 레이블 키 (brute_force, port_scan, ...)
pub const LABEL_THREAT_TYPE: &str = "threat_type";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Ingest 메트릭 ──────────────────────────────────────────────────

/// Ingest: 제출된 전체 라인 수 (counter)
pub const INGEST_LINES_TOTAL: &str = "logwarden_ingest_lines_total";

/// Ingest: 거부된 라인 수 (counter, 공백 라인 등)
pub const INGEST_LINES_REJECTED_TOTAL: &str = "logwarden_ingest_lines_rejected_total";

/// Ingest: 수락되어 저장까지 완료된 이벤트 수 (counter)
pub const INGEST_EVENTS_ACCEPTED_TOTAL: &str = "logwarden_ingest_events_accepted_total";

/// Ingest: 라인 하나의 전체 처리 지연 시간 (histogram, 초)
pub const INGEST_PROCESSING_DURATION_SECONDS: &str =
    "logwarden_ingest_processing_duration_seconds";

// ─── Parser 메트릭 ──────────────────────────────────────────────────

/// Parser: 형식별 파싱 성공 수 (counter, label: format)
pub const PARSER_PARSED_TOTAL: &str = "logwarden_parser_parsed_total";

/// Parser: 어떤 형식에도 매칭되지 않은 라인 수 (counter)
pub const PARSER_UNRECOGNIZED_TOTAL: &str = "logwarden_parser_unrecognized_total";

// ─── Classifier 메트릭 ──────────────────────────────────────────────

/// Classifier: 분류 결과 수 (counter, labels: label, threat_type)
pub const CLASSIFIER_RESULTS_TOTAL: &str = "logwarden_classifier_results_total";

/// Classifier: 폴백 판정 수 (counter)
pub const CLASSIFIER_FALLBACKS_TOTAL: &str = "logwarden_classifier_fallbacks_total";

// ─── Broadcast 메트릭 ───────────────────────────────────────────────

/// Broadcast: 현재 구독자 수 (gauge)
pub const BROADCAST_SUBSCRIBERS: &str = "logwarden_broadcast_subscribers";

/// Broadcast: 전달된 이벤트 수 (counter)
pub const BROADCAST_DELIVERED_TOTAL: &str = "logwarden_broadcast_delivered_total";

/// Broadcast: 채널 포화로 드롭된 전달 수 (counter)
pub const BROADCAST_DROPPED_TOTAL: &str = "logwarden_broadcast_dropped_total";

/// Broadcast: 닫힌 채널로 제거된 구독자 수 (counter)
pub const BROADCAST_REMOVED_TOTAL: &str = "logwarden_broadcast_removed_total";

// ─── Store 메트릭 ───────────────────────────────────────────────────

/// Store: 저장 시도 수 (counter, label: result)
pub const STORE_PERSIST_TOTAL: &str = "logwarden_store_persist_total";

/// Store: 저장 지연 시간 (histogram, 초)
pub const STORE_PERSIST_DURATION_SECONDS: &str = "logwarden_store_persist_duration_seconds";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "logwarden_daemon_uptime_seconds";

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "logwarden_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 라인 처리 지연 시간 히스토그램 버킷 (초)
///
/// 10us ~ 1s 범위, 로그 단위 분포
pub const PROCESSING_DURATION_BUCKETS: [f64; 9] = [
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.01, 0.1, 0.5, 1.0,
];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`, `describe_gauge!()`, `describe_histogram!()`을
/// 호출하여 Prometheus HELP 텍스트를 설정합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `logwarden-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Ingest
    describe_counter!(
        INGEST_LINES_TOTAL,
        "Total number of raw log lines submitted for ingestion"
    );
    describe_counter!(
        INGEST_LINES_REJECTED_TOTAL,
        "Total number of lines rejected before processing (blank or oversized)"
    );
    describe_counter!(
        INGEST_EVENTS_ACCEPTED_TOTAL,
        "Total number of events fully processed and persisted"
    );
    describe_histogram!(
        INGEST_PROCESSING_DURATION_SECONDS,
        "End-to-end processing latency for a single line in seconds"
    );

    // Parser
    describe_counter!(
        PARSER_PARSED_TOTAL,
        "Lines parsed per source format (syslog, apache, nginx, json)"
    );
    describe_counter!(
        PARSER_UNRECOGNIZED_TOTAL,
        "Lines that matched no registered format"
    );

    // Classifier
    describe_counter!(
        CLASSIFIER_RESULTS_TOTAL,
        "Classification results per label and threat type"
    );
    describe_counter!(
        CLASSIFIER_FALLBACKS_TOTAL,
        "Classifications that fell back to the conservative anomaly verdict"
    );

    // Broadcast
    describe_gauge!(
        BROADCAST_SUBSCRIBERS,
        "Number of currently registered broadcast subscribers"
    );
    describe_counter!(
        BROADCAST_DELIVERED_TOTAL,
        "Total number of events delivered to subscriber channels"
    );
    describe_counter!(
        BROADCAST_DROPPED_TOTAL,
        "Total number of deliveries dropped due to a full subscriber channel"
    );
    describe_counter!(
        BROADCAST_REMOVED_TOTAL,
        "Total number of subscribers removed after their channel closed"
    );

    // Store
    describe_counter!(
        STORE_PERSIST_TOTAL,
        "Total number of persist attempts per result"
    );
    describe_histogram!(
        STORE_PERSIST_DURATION_SECONDS,
        "Time to persist a single event in seconds"
    );

    // Daemon
    describe_gauge!(DAEMON_UPTIME_SECONDS, "Daemon uptime in seconds");
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (value is always 1, labels carry the version)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_follow_convention() {
        let names = [
            INGEST_LINES_TOTAL,
            INGEST_LINES_REJECTED_TOTAL,
            INGEST_EVENTS_ACCEPTED_TOTAL,
            INGEST_PROCESSING_DURATION_SECONDS,
            PARSER_PARSED_TOTAL,
            PARSER_UNRECOGNIZED_TOTAL,
            CLASSIFIER_RESULTS_TOTAL,
            CLASSIFIER_FALLBACKS_TOTAL,
            BROADCAST_SUBSCRIBERS,
            BROADCAST_DELIVERED_TOTAL,
            BROADCAST_DROPPED_TOTAL,
            BROADCAST_REMOVED_TOTAL,
            STORE_PERSIST_TOTAL,
            STORE_PERSIST_DURATION_SECONDS,
            DAEMON_UPTIME_SECONDS,
            DAEMON_BUILD_INFO,
        ];
        for name in names {
            assert!(name.starts_with("logwarden_"), "bad prefix: {name}");
        }
    }

    #[test]
    fn histogram_buckets_are_sorted() {
        let mut sorted = PROCESSING_DURATION_BUCKETS;
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted, PROCESSING_DURATION_BUCKETS);
    }

    #[test]
    fn describe_all_does_not_panic_without_recorder() {
        describe_all();
    }
}
