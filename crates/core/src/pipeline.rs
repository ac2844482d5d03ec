//! 파이프라인 trait -- 모듈 확장 포인트 정의

use crate::error::StoreError;
use crate::types::{EnrichedEvent, ParsedRecord, SourceFormat};

/// 형식 매처 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현하고
/// 라우터의 우선순위 목록에 등록합니다.
pub trait FormatMatcher: Send + Sync {
    /// 이 매처가 감지하는 소스 형식
    fn source(&self) -> SourceFormat;

    /// 라인이 이 형식에 매칭되면 추출된 레코드를 반환합니다.
    ///
    /// 매칭 실패는 에러가 아니라 `None`입니다 -- 라우터가 다음 매처를
    /// 시도합니다.
    fn try_parse(&self, line: &str) -> Option<ParsedRecord>;
}

/// 이벤트 저장소 trait
///
/// 외부 문서 저장소 협력자를 추상화합니다. 수락된 라인마다 정확히
/// 한 번의 `persist` 호출이 발생합니다. 조회 경로(최근 N건)는
/// 협력자 계약이며 파이프라인 코어는 사용하지 않습니다.
pub trait EventStore: Send + Sync {
    /// 이벤트를 고정 문서 형태로 영속화합니다.
    fn persist(
        &self,
        event: &EnrichedEvent,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// 타임스탬프 내림차순으로 최근 문서를 조회합니다.
    fn recent(
        &self,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<serde_json::Value>, StoreError>> + Send;
}
