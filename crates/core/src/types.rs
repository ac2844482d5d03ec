//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 모든 모듈이 공유하는 데이터 구조를 정의합니다.
//! 수집된 원시 로그 한 줄은 `RawLogLine` → `ParsedRecord` →
//! (분류 결과와 합쳐져) `EnrichedEvent` 순서로 변환됩니다.
//! `EnrichedEvent`만이 파이프라인 밖(저장소, 구독자)으로 나갑니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 원시 로그 라인
///
/// 호출자가 소유하다가 오케스트레이터에 전달하는 입력 단위입니다.
/// 호출자가 이미 타임스탬프를 알고 있으면 함께 전달할 수 있습니다.
#[derive(Debug, Clone)]
pub struct RawLogLine {
    /// 원본 텍스트
    pub raw: String,
    /// 호출자 제공 타임스탬프 (있으면 파싱 결과보다 우선)
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawLogLine {
    /// 원본 텍스트만으로 새 라인을 생성합니다.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            timestamp: None,
        }
    }

    /// 호출자 제공 타임스탬프를 설정합니다.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// 로그 소스 형식
///
/// 형식 감지 결과를 나타냅니다. 어느 매처도 성공하지 못하면
/// `Unrecognized`로 태깅되며, 이 경우에도 원본 텍스트는 그대로 보존됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// BSD syslog (`MMM DD HH:MM:SS host process: message`)
    Syslog,
    /// Apache combined access log
    Apache,
    /// Nginx access log
    Nginx,
    /// 구조화 JSON 객체
    Json,
    /// 어느 형식에도 매칭되지 않음
    Unrecognized,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syslog => write!(f, "syslog"),
            Self::Apache => write!(f, "apache"),
            Self::Nginx => write!(f, "nginx"),
            Self::Json => write!(f, "json"),
            Self::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// 파싱된 로그 레코드
///
/// 형식 감지가 추출한 필드의 정규화 표현입니다. 형식마다 채워지는
/// 필드가 다르므로 대부분 `Option`이며, `raw`는 항상 원본 그대로입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// 감지된 소스 형식
    pub source: SourceFormat,
    /// 원본 텍스트 (항상 보존)
    pub raw: String,
    /// 추출된 타임스탬프
    pub timestamp: Option<DateTime<Utc>>,
    /// 호스트명
    pub host: Option<String>,
    /// 프로세스/서비스명
    pub process: Option<String>,
    /// 메시지 본문
    pub message: Option<String>,
    /// 클라이언트 IP (access log)
    pub ip: Option<String>,
    /// HTTP 메서드 (access log)
    pub method: Option<String>,
    /// 요청 경로 (access log)
    pub path: Option<String>,
    /// HTTP 상태 코드 (access log)
    pub status: Option<u16>,
    /// 응답 크기 (access log)
    pub size: Option<u64>,
    /// 로그 레벨 (JSON 로그)
    pub level: Option<String>,
    /// 매핑되지 않은 추가 필드 (key-value 쌍)
    pub extra: Vec<(String, String)>,
}

impl ParsedRecord {
    /// 지정한 형식의 빈 레코드를 생성합니다. 원본 텍스트는 그대로 보존됩니다.
    pub fn new(source: SourceFormat, raw: impl Into<String>) -> Self {
        Self {
            source,
            raw: raw.into(),
            timestamp: None,
            host: None,
            process: None,
            message: None,
            ip: None,
            method: None,
            path: None,
            status: None,
            size: None,
            level: None,
            extra: Vec::new(),
        }
    }

    /// 어느 형식에도 매칭되지 않은 레코드를 생성합니다.
    ///
    /// 불변식: 원본 텍스트가 한 글자도 바뀌지 않고 보존됩니다.
    pub fn unrecognized(raw: impl Into<String>) -> Self {
        Self::new(SourceFormat::Unrecognized, raw)
    }
}

impl fmt::Display for ParsedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.source,
            self.host.as_deref().unwrap_or("-"),
            self.process.as_deref().unwrap_or("-"),
            self.message.as_deref().unwrap_or(&self.raw),
        )
    }
}

/// 분류 레이블
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// 정상 로그
    #[default]
    Normal,
    /// 이상 로그
    Anomaly,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Anomaly => write!(f, "anomaly"),
        }
    }
}

/// 위협 카테고리 -- 닫힌 레이블 집합
///
/// 이상으로 판정된 로그에 2차 분류 단계가 부여하는 카테고리입니다.
/// `Normal`은 정상 로그에, `Unknown`은 스코어링 실패 폴백에 사용됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    /// 정상 (이상 아님)
    #[default]
    Normal,
    /// 브루트포스 (반복 로그인 실패)
    BruteForce,
    /// 포트 스캔
    PortScan,
    /// 서비스 거부 공격
    DosAttack,
    /// 의심스러운 로그인
    SuspiciousLogin,
    /// 악성코드 활동
    MalwareActivity,
    /// 분류 불가 (스코어링 실패 폴백)
    Unknown,
}

impl ThreatType {
    /// 이상 로그에 부여 가능한 위협 카테고리 목록 (Normal/Unknown 제외)
    pub const CATEGORIES: [ThreatType; 5] = [
        Self::BruteForce,
        Self::PortScan,
        Self::DosAttack,
        Self::SuspiciousLogin,
        Self::MalwareActivity,
    ];
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::BruteForce => write!(f, "brute_force"),
            Self::PortScan => write!(f, "port_scan"),
            Self::DosAttack => write!(f, "dos_attack"),
            Self::SuspiciousLogin => write!(f, "suspicious_login"),
            Self::MalwareActivity => write!(f, "malware_activity"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// 분류 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// 정상/이상 레이블
    pub label: Label,
    /// 위협 카테고리
    pub threat_type: ThreatType,
    /// 분류 신뢰도 (0.0~1.0, 산출 가능한 경우)
    pub confidence: Option<f64>,
}

impl ClassificationResult {
    /// 정상 판정 결과를 생성합니다.
    pub fn normal(confidence: Option<f64>) -> Self {
        Self {
            label: Label::Normal,
            threat_type: ThreatType::Normal,
            confidence,
        }
    }

    /// 이상 판정 결과를 생성합니다.
    pub fn anomaly(threat_type: ThreatType, confidence: Option<f64>) -> Self {
        Self {
            label: Label::Anomaly,
            threat_type,
            confidence,
        }
    }

    /// 스코어링 실패 시의 폴백 결과입니다.
    ///
    /// 분류 실패가 수집 실패로 전파되지 않도록, 이벤트를 버리는 대신
    /// `unknown` 위협 카테고리로 태깅하여 보존합니다.
    pub fn fallback() -> Self {
        Self {
            label: Label::Anomaly,
            threat_type: ThreatType::Unknown,
            confidence: None,
        }
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.confidence {
            Some(c) => write!(f, "{}/{} ({:.2})", self.label, self.threat_type, c),
            None => write!(f, "{}/{}", self.label, self.threat_type),
        }
    }
}

/// 보강된 이벤트 -- 파이프라인 밖으로 나가는 유일한 엔티티
///
/// 파싱 결과, 분류 결과, 타임스탬프를 합친 불변 단위입니다.
/// 저장소에 영속화되고 구독자에게 브로드캐스트됩니다.
///
/// # 불변식
/// - `raw`는 항상 비어 있지 않습니다 (공백 라인은 수집 전에 거부).
/// - `timestamp`는 항상 존재합니다 (없으면 수집 시각으로 대체).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedEvent {
    /// 이벤트 고유 ID (UUID v4)
    pub id: String,
    /// 파싱된 레코드
    pub record: ParsedRecord,
    /// 분류 결과
    pub classification: ClassificationResult,
    /// 이벤트 타임스탬프 (레코드 타임스탬프, 없으면 수집 시각)
    pub timestamp: DateTime<Utc>,
    /// 수집 시각
    pub ingested_at: DateTime<Utc>,
}

impl EnrichedEvent {
    /// 파싱/분류 결과를 합쳐 새 이벤트를 생성합니다.
    ///
    /// 타임스탬프 우선순위: `timestamp_override` > 레코드 타임스탬프 > `ingested_at`.
    pub fn new(
        record: ParsedRecord,
        classification: ClassificationResult,
        timestamp_override: Option<DateTime<Utc>>,
        ingested_at: DateTime<Utc>,
    ) -> Self {
        let timestamp = timestamp_override
            .or(record.timestamp)
            .unwrap_or(ingested_at);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            record,
            classification,
            timestamp,
            ingested_at,
        }
    }

    /// 원본 텍스트를 반환합니다.
    pub fn raw(&self) -> &str {
        &self.record.raw
    }

    /// 저장소에 영속화되는 고정 문서 형태를 렌더링합니다.
    ///
    /// 형태: `{raw, timestamp, prediction, threat_type, ingested_at}`
    /// (타임스탬프는 ISO 8601 / RFC 3339)
    pub fn document(&self) -> serde_json::Value {
        serde_json::json!({
            "raw": self.record.raw,
            "timestamp": self.timestamp.to_rfc3339(),
            "prediction": self.classification.label.to_string(),
            "threat_type": self.classification.threat_type.to_string(),
            "ingested_at": self.ingested_at.to_rfc3339(),
        })
    }
}

impl fmt::Display for EnrichedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.timestamp.to_rfc3339(),
            self.classification,
            self.record,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ParsedRecord {
        let mut record = ParsedRecord::new(SourceFormat::Syslog, "raw line");
        record.host = Some("server-01".to_owned());
        record.process = Some("sshd".to_owned());
        record.message = Some("session opened".to_owned());
        record
    }

    #[test]
    fn source_format_display() {
        assert_eq!(SourceFormat::Syslog.to_string(), "syslog");
        assert_eq!(SourceFormat::Apache.to_string(), "apache");
        assert_eq!(SourceFormat::Nginx.to_string(), "nginx");
        assert_eq!(SourceFormat::Json.to_string(), "json");
        assert_eq!(SourceFormat::Unrecognized.to_string(), "unrecognized");
    }

    #[test]
    fn unrecognized_record_preserves_raw_verbatim() {
        let raw = "  \tweird ##@! input that matches nothing  ";
        let record = ParsedRecord::unrecognized(raw);
        assert_eq!(record.source, SourceFormat::Unrecognized);
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn threat_type_display_matches_closed_set() {
        assert_eq!(ThreatType::BruteForce.to_string(), "brute_force");
        assert_eq!(ThreatType::PortScan.to_string(), "port_scan");
        assert_eq!(ThreatType::DosAttack.to_string(), "dos_attack");
        assert_eq!(ThreatType::SuspiciousLogin.to_string(), "suspicious_login");
        assert_eq!(ThreatType::MalwareActivity.to_string(), "malware_activity");
        assert_eq!(ThreatType::Unknown.to_string(), "unknown");
    }

    #[test]
    fn threat_type_serde_snake_case() {
        let json = serde_json::to_string(&ThreatType::BruteForce).unwrap();
        assert_eq!(json, "\"brute_force\"");
        let back: ThreatType = serde_json::from_str("\"port_scan\"").unwrap();
        assert_eq!(back, ThreatType::PortScan);
    }

    #[test]
    fn fallback_result_is_unknown_anomaly() {
        let result = ClassificationResult::fallback();
        assert_eq!(result.label, Label::Anomaly);
        assert_eq!(result.threat_type, ThreatType::Unknown);
        assert!(result.confidence.is_none());
    }

    #[test]
    fn event_timestamp_falls_back_to_ingested_at() {
        let record = ParsedRecord::unrecognized("no timestamp here");
        let ingested_at = Utc::now();
        let event = EnrichedEvent::new(
            record,
            ClassificationResult::normal(None),
            None,
            ingested_at,
        );
        assert_eq!(event.timestamp, ingested_at);
    }

    #[test]
    fn event_timestamp_override_wins() {
        let mut record = sample_record();
        record.timestamp = Some("2025-06-15T04:06:20Z".parse().unwrap());
        let override_ts: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        let event = EnrichedEvent::new(
            record,
            ClassificationResult::normal(None),
            Some(override_ts),
            Utc::now(),
        );
        assert_eq!(event.timestamp, override_ts);
    }

    #[test]
    fn document_has_fixed_shape() {
        let event = EnrichedEvent::new(
            sample_record(),
            ClassificationResult::anomaly(ThreatType::BruteForce, Some(0.93)),
            None,
            Utc::now(),
        );
        let doc = event.document();
        assert_eq!(doc["raw"], "raw line");
        assert_eq!(doc["prediction"], "anomaly");
        assert_eq!(doc["threat_type"], "brute_force");
        assert!(doc["timestamp"].is_string());
        assert!(doc["ingested_at"].is_string());
        assert_eq!(doc.as_object().unwrap().len(), 5);
    }

    #[test]
    fn event_ids_are_unique() {
        let make = || {
            EnrichedEvent::new(
                sample_record(),
                ClassificationResult::normal(None),
                None,
                Utc::now(),
            )
        };
        assert_ne!(make().id, make().id);
    }

    #[test]
    fn event_serialize_roundtrip() {
        let event = EnrichedEvent::new(
            sample_record(),
            ClassificationResult::anomaly(ThreatType::PortScan, None),
            None,
            Utc::now(),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: EnrichedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, event.id);
        assert_eq!(back.classification.threat_type, ThreatType::PortScan);
        assert_eq!(back.record.raw, "raw line");
    }
}
