//! 로그 형식 감지 및 파싱 모듈
//!
//! [`FormatRouter`]는 원시 로그 라인의 형식을 판별하여 적절한 매처를 선택합니다.
//! 각 매처는 core의 [`FormatMatcher`](logwarden_core::pipeline::FormatMatcher)
//! trait을 구현합니다.
//!
//! # 지원 형식
//! - BSD syslog ([`SyslogMatcher`])
//! - Apache combined 접근 로그 ([`ApacheMatcher`])
//! - Nginx 접근 로그 ([`NginxMatcher`])
//! - 구조화 JSON ([`JsonMatcher`])
//!
//! # 사용 예시
//! ```
//! use logwarden_pipeline::parser::FormatRouter;
//! use logwarden_core::types::SourceFormat;
//!
//! let router = FormatRouter::with_defaults();
//! let record = router.parse("Jun 15 04:06:20 host sshd[1234]: Failed password");
//! assert_eq!(record.source, SourceFormat::Syslog);
//! ```

pub mod apache;
pub mod json;
pub mod nginx;
pub mod syslog;

pub use apache::ApacheMatcher;
pub use json::JsonMatcher;
pub use nginx::NginxMatcher;
pub use syslog::SyslogMatcher;

use logwarden_core::pipeline::FormatMatcher;
use logwarden_core::types::{ParsedRecord, SourceFormat};

/// 형식 라우터 -- 로그 형식을 자동 감지하여 적절한 매처를 선택합니다.
///
/// 등록된 매처 목록을 순회하며, 첫 번째로 매칭에 성공한 매처의 결과를
/// 반환합니다. 매칭 순서가 곧 우선순위입니다. 모든 매처가 실패해도 에러가
/// 아니라 원문을 그대로 보존한 `Unrecognized` 레코드를 반환합니다.
pub struct FormatRouter {
    /// 등록된 매처 목록 (순서대로 시도)
    matchers: Vec<Box<dyn FormatMatcher>>,
}

impl FormatRouter {
    /// 매처 없이 빈 라우터를 생성합니다.
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// 기본 매처 세트로 라우터를 생성합니다.
    ///
    /// 우선순위: syslog, Apache, nginx, JSON.
    /// 가장 구체적인 형식을 먼저 시도합니다.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Box::new(SyslogMatcher::new()))
            .register(Box::new(ApacheMatcher::new()))
            .register(Box::new(NginxMatcher::new()))
            .register(Box::new(JsonMatcher::new()))
    }

    /// 매처를 등록합니다. 등록 순서대로 시도됩니다.
    pub fn register(mut self, matcher: Box<dyn FormatMatcher>) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// 원시 로그 라인을 파싱합니다. 절대 실패하지 않습니다.
    ///
    /// 등록된 매처를 순서대로 시도하여 첫 번째 성공 결과를 반환합니다.
    /// 어떤 매처도 매칭하지 못하면 `Unrecognized` 레코드를 반환하며,
    /// 이때 원문은 한 글자도 변형 없이 보존됩니다.
    pub fn parse(&self, line: &str) -> ParsedRecord {
        for matcher in &self.matchers {
            if let Some(record) = matcher.try_parse(line) {
                return record;
            }
        }
        ParsedRecord::unrecognized(line)
    }

    /// 등록된 매처의 형식 목록을 반환합니다.
    pub fn registered_formats(&self) -> Vec<SourceFormat> {
        self.matchers.iter().map(|m| m.source()).collect()
    }
}

impl Default for FormatRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
