//! Nginx 접근 로그 매처
//!
//! ```text
//! ip - user [time] "request" status size
//! ```
//!
//! 기본 `combined` 설정의 앞부분과 같은 형태지만 ident 자리가 항상 `-`라는
//! 점으로 Apache와 구분합니다. request 문자열의 첫 토큰을 method, 두 번째
//! 토큰을 path로 추출합니다.

use chrono::{DateTime, Utc};
use regex::Regex;

use logwarden_core::pipeline::FormatMatcher;
use logwarden_core::types::{ParsedRecord, SourceFormat};

/// Nginx 접근 로그 패턴
const NGINX_PATTERN: &str = r#"^(?P<ip>\d{1,3}(?:\.\d{1,3}){3}) - (?P<user>\S+) \[(?P<time>[^\]]+)\] "(?P<request>[^"]*)" (?P<status>\d{3}) (?P<size>\d+|-)(?P<tail> .*)?$"#;

/// Nginx 접근 로그 타임스탬프 형식 (Apache와 동일)
const NGINX_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Nginx 접근 로그 매처
pub struct NginxMatcher {
    pattern: Regex,
}

impl NginxMatcher {
    /// 새 매처를 생성합니다.
    pub fn new() -> Self {
        let pattern = Regex::new(NGINX_PATTERN).expect("nginx pattern is valid");
        Self { pattern }
    }
}

impl Default for NginxMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatMatcher for NginxMatcher {
    fn source(&self) -> SourceFormat {
        SourceFormat::Nginx
    }

    fn try_parse(&self, line: &str) -> Option<ParsedRecord> {
        let caps = self.pattern.captures(line)?;

        let timestamp = DateTime::parse_from_str(&caps["time"], NGINX_TIME_FORMAT)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));

        let mut request_tokens = caps["request"].split(' ');
        let method = request_tokens.next().filter(|t| !t.is_empty());
        let path = request_tokens.next();

        let mut record = ParsedRecord::new(SourceFormat::Nginx, line);
        record.timestamp = timestamp;
        record.ip = Some(caps["ip"].to_owned());
        record.method = method.map(str::to_owned);
        record.path = path.map(str::to_owned);
        record.status = caps["status"].parse().ok();
        record.size = caps["size"].parse().ok();
        Some(record)
    }
}
