//! 구조화 JSON 로그 매처
//!
//! 한 줄 전체가 JSON 객체인 구조화 로그를 파싱합니다. 접두/접미 검사 같은
//! 휴리스틱 없이 `serde_json` 디코딩 성공 여부로만 판별합니다.
//!
//! 매핑 규칙:
//! - `timestamp`: RFC 3339 또는 타임존이 없는 ISO 형식 (UTC 가정)
//! - `level`: 로그 레벨 문자열
//! - `msg` (또는 `message`): 메시지 본문
//! - 그 외의 모든 키는 `extra`에 문자열화되어 보존

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use logwarden_core::pipeline::FormatMatcher;
use logwarden_core::types::{ParsedRecord, SourceFormat};

/// 타임존 없는 ISO 타임스탬프 형식 (소수점 초 허용)
const NAIVE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// 구조화 JSON 로그 매처
#[derive(Default)]
pub struct JsonMatcher;

impl JsonMatcher {
    /// 새 매처를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 타임스탬프 문자열을 파싱합니다. RFC 3339 우선, 실패 시 naive ISO를
    /// UTC로 가정합니다.
    fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(value, NAIVE_TIME_FORMAT)
            .ok()
            .map(|dt| dt.and_utc())
    }

    /// extra에 넣을 값의 문자열 표현. 문자열은 따옴표 없이 그대로,
    /// 나머지 타입은 JSON 직렬화 형태를 씁니다.
    fn value_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl FormatMatcher for JsonMatcher {
    fn source(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn try_parse(&self, line: &str) -> Option<ParsedRecord> {
        let value: Value = serde_json::from_str(line.trim()).ok()?;
        let object = value.as_object()?;

        let mut record = ParsedRecord::new(SourceFormat::Json, line);

        for (key, val) in object {
            match key.as_str() {
                "timestamp" => {
                    record.timestamp = val.as_str().and_then(Self::parse_timestamp);
                    // 파싱 불가능한 타임스탬프는 extra로 강등
                    if record.timestamp.is_none() {
                        record
                            .extra
                            .push((key.clone(), Self::value_to_string(val)));
                    }
                }
                "level" => record.level = val.as_str().map(str::to_owned),
                "msg" | "message" => {
                    if record.message.is_none() {
                        record.message = val.as_str().map(str::to_owned);
                    }
                }
                _ => record.extra.push((key.clone(), Self::value_to_string(val))),
            }
        }

        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_basic_object() {
        let matcher = JsonMatcher::new();
        let record = matcher
            .try_parse(r#"{"timestamp":"2025-06-16T10:00:00","level":"INFO","msg":"ok"}"#)
            .unwrap();
        assert_eq!(record.source, SourceFormat::Json);
        assert_eq!(record.level.as_deref(), Some("INFO"));
        assert_eq!(record.message.as_deref(), Some("ok"));
        let ts = record.timestamp.unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn message_alias_is_accepted() {
        let matcher = JsonMatcher::new();
        let record = matcher
            .try_parse(r#"{"level":"WARN","message":"disk nearly full"}"#)
            .unwrap();
        assert_eq!(record.message.as_deref(), Some("disk nearly full"));
    }

    #[test]
    fn rfc3339_timestamp_is_parsed() {
        let matcher = JsonMatcher::new();
        let record = matcher
            .try_parse(r#"{"timestamp":"2025-06-16T10:00:00+09:00","msg":"x"}"#)
            .unwrap();
        // +09:00 오프셋이 UTC로 변환
        assert_eq!(record.timestamp.unwrap().hour(), 1);
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let matcher = JsonMatcher::new();
        let record = matcher
            .try_parse(r#"{"msg":"x","service":"auth","attempt":3}"#)
            .unwrap();
        let extra: std::collections::HashMap<_, _> = record.extra.into_iter().collect();
        assert_eq!(extra.get("service").map(String::as_str), Some("auth"));
        assert_eq!(extra.get("attempt").map(String::as_str), Some("3"));
    }

    #[test]
    fn rejects_non_object_json() {
        let matcher = JsonMatcher::new();
        assert!(matcher.try_parse("[1, 2, 3]").is_none());
        assert!(matcher.try_parse("42").is_none());
        assert!(matcher.try_parse("\"just a string\"").is_none());
    }

    #[test]
    fn rejects_invalid_json() {
        let matcher = JsonMatcher::new();
        assert!(matcher.try_parse("{not valid").is_none());
    }

    #[test]
    fn unparseable_timestamp_demotes_to_extra() {
        let matcher = JsonMatcher::new();
        let record = matcher
            .try_parse(r#"{"timestamp":"yesterday","msg":"x"}"#)
            .unwrap();
        assert_eq!(record.timestamp, None);
        assert!(
            record
                .extra
                .iter()
                .any(|(k, v)| k == "timestamp" && v == "yesterday")
        );
    }
}
