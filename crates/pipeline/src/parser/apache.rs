//! Apache combined 접근 로그 매처
//!
//! ```text
//! ip ident user [DD/Mon/YYYY:HH:MM:SS zone] "METHOD path proto" status size "referer" "agent"
//! ```
//!
//! referer/agent 꼬리는 선택입니다. 상태 코드와 크기의 `-` 값은 None으로
//! 처리합니다.

use chrono::{DateTime, Utc};
use regex::Regex;

use logwarden_core::pipeline::FormatMatcher;
use logwarden_core::types::{ParsedRecord, SourceFormat};

/// Apache combined 로그 패턴
const APACHE_PATTERN: &str = r#"^(?P<ip>\d{1,3}(?:\.\d{1,3}){3}) (?P<ident>\S+) (?P<user>\S+) \[(?P<time>[^\]]+)\] "(?P<method>[A-Z]+) (?P<path>\S+) (?P<proto>HTTP/[\d.]+)" (?P<status>\d{3}|-) (?P<size>\d+|-)(?P<tail> .*)?$"#;

/// Apache 접근 로그 타임스탬프 형식 (`%d/%b/%Y:%H:%M:%S %z`)
const APACHE_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Apache combined 접근 로그 매처
pub struct ApacheMatcher {
    pattern: Regex,
}

impl ApacheMatcher {
    /// 새 매처를 생성합니다.
    pub fn new() -> Self {
        let pattern = Regex::new(APACHE_PATTERN).expect("apache pattern is valid");
        Self { pattern }
    }
}

impl Default for ApacheMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatMatcher for ApacheMatcher {
    fn source(&self) -> SourceFormat {
        SourceFormat::Apache
    }

    fn try_parse(&self, line: &str) -> Option<ParsedRecord> {
        let caps = self.pattern.captures(line)?;

        let timestamp = DateTime::parse_from_str(&caps["time"], APACHE_TIME_FORMAT)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));

        let mut record = ParsedRecord::new(SourceFormat::Apache, line);
        record.timestamp = timestamp;
        record.ip = Some(caps["ip"].to_owned());
        record.method = Some(caps["method"].to_owned());
        record.path = Some(caps["path"].to_owned());
        record.status = caps["status"].parse().ok();
        record.size = caps["size"].parse().ok();
        Some(record)
    }
}
