//! 에러 타입 -- 도메인별 에러 정의
//!
//! 파싱/특징 추출/분류 실패는 에러로 전파되지 않고 결과에 인코딩됩니다
//! (미인식 형식, 센티널 값, 폴백 분류). 여기 정의된 에러는 호출자에게
//! 명시적으로 반환되어야 하는 실패(설정, 모델 로딩, 영속화)만 다룹니다.

/// Logwarden 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogwardenError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 모델 아티팩트 로딩/검증 에러
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// 저장소 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 모델 아티팩트 에러
///
/// 분류기 자체는 에러를 내지 않습니다 (스코어링 실패는 폴백 결과로
/// 흡수). 이 에러는 시작 시점의 아티팩트 로딩/검증에만 사용됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// 아티팩트 파일을 찾을 수 없음
    #[error("model artifact not found: {path}")]
    FileNotFound { path: String },

    /// 아티팩트 디코딩 실패
    #[error("failed to decode model artifact: {reason}")]
    DecodeFailed { reason: String },

    /// 특징 스키마 버전 불일치
    #[error("feature schema mismatch: model declares v{model}, pipeline expects v{expected}")]
    SchemaMismatch { model: u32, expected: u32 },

    /// 가중치 차원 불일치
    #[error("invalid model shape: {reason}")]
    InvalidShape { reason: String },
}

/// 저장소 에러
///
/// 영속화 실패는 해당 수집 호출에만 치명적이며 호출자에게 그대로
/// 반환됩니다. 프로세스는 계속 살아있습니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 쓰기 실패
    #[error("persist failed: {0}")]
    Persist(String),

    /// 조회 실패
    #[error("query failed: {0}")]
    Query(String),

    /// 저장소 I/O 에러
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
}
