//! 파이프라인 도메인 에러 타입
//!
//! 파싱 실패와 분류 실패는 에러가 아니라 degraded 결과(Unrecognized, 폴백
//! 판정)로 흡수되므로 여기에 변형이 없습니다. 수집 경로에서 호출자에게
//! 전파되는 실패는 저장소 실패와 설정/모델 로딩 실패뿐입니다.

use logwarden_core::error::{LogwardenError, ModelError, StoreError};
use thiserror::Error;

/// 수집 경로에서 발생하는 에러
#[derive(Debug, Error)]
pub enum IngestError {
    /// 이벤트 저장 실패. 해당 이벤트는 방송되지 않습니다.
    #[error("event store failure: {0}")]
    Store(#[from] StoreError),

    /// 모델 아티팩트 로딩/검증 실패 (시작 시점에만 발생)
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// 오케스트레이터 구성 오류
    #[error("invalid orchestrator configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<IngestError> for LogwardenError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Store(e) => LogwardenError::Store(e),
            IngestError::Model(e) => LogwardenError::Model(e),
            IngestError::InvalidConfig { reason } => {
                LogwardenError::Config(logwarden_core::error::ConfigError::InvalidValue {
                    field: "orchestrator".to_owned(),
                    reason,
                })
            }
        }
    }
}
