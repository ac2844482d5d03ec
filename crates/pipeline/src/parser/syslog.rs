//! BSD syslog 매처
//!
//! `MMM DD HH:MM:SS host process[pid]: message` 형태의 전통적인
//! BSD syslog (RFC 3164 계열) 라인을 파싱합니다.
//!
//! BSD syslog 타임스탬프에는 연도가 없으므로 현재 벽시계 연도를 가정합니다.
//! 연말/연초 경계에서 1년 어긋날 수 있는 알려진 한계입니다.
//!
//! # 사용 예시
//! ```
//! use logwarden_pipeline::parser::SyslogMatcher;
//! use logwarden_core::pipeline::FormatMatcher;
//!
//! let matcher = SyslogMatcher::new();
//! let record = matcher
//!     .try_parse("Jun 15 04:06:20 host sshd[1234]: Failed password")
//!     .unwrap();
//! assert_eq!(record.process.as_deref(), Some("sshd"));
//! ```

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use regex::Regex;

use logwarden_core::pipeline::FormatMatcher;
use logwarden_core::types::{ParsedRecord, SourceFormat};

/// BSD syslog 라인 패턴
///
/// `[pid]` 접미사는 선택이며 process 필드에서 제거됩니다.
const SYSLOG_PATTERN: &str = r"^(?P<month>[A-Z][a-z]{2})\s+(?P<day>\d{1,2}) (?P<hour>\d{2}):(?P<min>\d{2}):(?P<sec>\d{2}) (?P<host>\S+) (?P<process>[\w\-./]+)(?:\[\d+\])?: (?P<message>.*)$";

/// BSD syslog 매처
pub struct SyslogMatcher {
    pattern: Regex,
}

impl SyslogMatcher {
    /// 새 매처를 생성합니다.
    pub fn new() -> Self {
        // 컴파일 타임 상수 패턴이라 실패하지 않음
        let pattern = Regex::new(SYSLOG_PATTERN).expect("syslog pattern is valid");
        Self { pattern }
    }

    /// 월 약어를 월 번호로 변환합니다.
    fn month_number(abbrev: &str) -> Option<u32> {
        match abbrev {
            "Jan" => Some(1),
            "Feb" => Some(2),
            "Mar" => Some(3),
            "Apr" => Some(4),
            "May" => Some(5),
            "Jun" => Some(6),
            "Jul" => Some(7),
            "Aug" => Some(8),
            "Sep" => Some(9),
            "Oct" => Some(10),
            "Nov" => Some(11),
            "Dec" => Some(12),
            _ => None,
        }
    }
}

impl Default for SyslogMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatMatcher for SyslogMatcher {
    fn source(&self) -> SourceFormat {
        SourceFormat::Syslog
    }

    fn try_parse(&self, line: &str) -> Option<ParsedRecord> {
        let caps = self.pattern.captures(line)?;

        let month = Self::month_number(&caps["month"])?;
        let day: u32 = caps["day"].parse().ok()?;
        let hour: u32 = caps["hour"].parse().ok()?;
        let min: u32 = caps["min"].parse().ok()?;
        let sec: u32 = caps["sec"].parse().ok()?;

        // 연도가 라인에 없으므로 현재 연도 가정
        let year = Utc::now().year();
        let timestamp = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, min, sec))
            .and_then(|dt| Utc.from_local_datetime(&dt).single())?;

        let mut record = ParsedRecord::new(SourceFormat::Syslog, line);
        record.timestamp = Some(timestamp);
        record.host = Some(caps["host"].to_owned());
        record.process = Some(caps["process"].to_owned());
        record.message = Some(caps["message"].to_owned());
        Some(record)
    }
}
