//! 특징 추출 모듈
//!
//! 파싱된 레코드에서 분류기가 소비하는 수치 특징 벡터를 계산합니다.
//! 모든 텍스트 특징은 파싱 결과가 아니라 원문(raw) 전체를 기준으로
//! 계산하므로, Unrecognized 레코드도 똑같이 분류 대상이 됩니다.
//!
//! 추출은 결정적입니다. 같은 레코드는 언제나 같은 벡터를 냅니다.

use regex::Regex;

use logwarden_core::types::ParsedRecord;

/// 특징 스키마 버전
///
/// 모델 아티팩트의 `schema_version`과 일치해야 로딩이 허용됩니다.
/// 특징 순서나 의미가 바뀌면 반드시 올려야 합니다.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// 특징 벡터 차원 수
pub const FEATURE_COUNT: usize = 8;

/// IPv4 리터럴 감지 패턴
const IPV4_PATTERN: &str = r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b";

/// 키워드 플래그 목록 (벡터 내 순서 고정)
const KEYWORDS: [&str; 5] = ["failed", "connection", "invalid", "malicious", "scan"];

/// 한 레코드의 수치 특징
///
/// `as_array()`의 순서는 모델 가중치 순서와 일치합니다:
/// `[length, contains_ip, hour, failed, connection, invalid, malicious, scan]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// 원문 길이 (문자 수)
    pub length: f64,
    /// IPv4 리터럴 포함 여부 (0 또는 1)
    pub contains_ip: f64,
    /// 타임스탬프의 시(hour), 없으면 -1
    pub hour: f64,
    /// "failed" 포함 여부
    pub failed: f64,
    /// "connection" 포함 여부
    pub connection: f64,
    /// "invalid" 포함 여부
    pub invalid: f64,
    /// "malicious" 포함 여부
    pub malicious: f64,
    /// "scan" 포함 여부
    pub scan: f64,
}

impl FeatureVector {
    /// 스키마 순서대로 배열을 반환합니다.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.length,
            self.contains_ip,
            self.hour,
            self.failed,
            self.connection,
            self.invalid,
            self.malicious,
            self.scan,
        ]
    }
}

/// 특징 추출기
///
/// 정규식을 한 번만 컴파일해 재사용합니다.
pub struct FeatureExtractor {
    ipv4: Regex,
}

impl FeatureExtractor {
    /// 새 추출기를 생성합니다.
    pub fn new() -> Self {
        let ipv4 = Regex::new(IPV4_PATTERN).expect("ipv4 pattern is valid");
        Self { ipv4 }
    }

    /// 레코드에서 특징 벡터를 추출합니다.
    pub fn extract(&self, record: &ParsedRecord) -> FeatureVector {
        let raw = record.raw.as_str();
        let lowered = raw.to_lowercase();

        let flag = |keyword: &str| -> f64 {
            if lowered.contains(keyword) { 1.0 } else { 0.0 }
        };

        FeatureVector {
            length: raw.chars().count() as f64,
            contains_ip: if self.ipv4.is_match(raw) { 1.0 } else { 0.0 },
            hour: record
                .timestamp
                .map_or(-1.0, |ts| f64::from(chrono::Timelike::hour(&ts))),
            failed: flag(KEYWORDS[0]),
            connection: flag(KEYWORDS[1]),
            invalid: flag(KEYWORDS[2]),
            malicious: flag(KEYWORDS[3]),
            scan: flag(KEYWORDS[4]),
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
