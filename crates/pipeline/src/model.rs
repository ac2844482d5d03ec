//! 위협 모델 아티팩트
//!
//! 분류기가 사용하는 읽기 전용 가중치 모음입니다. JSON 아티팩트에서
//! 로드하거나 내장 기본 가중치를 사용합니다. 런타임 리로드 경로는 없으며,
//! 시작 시 한 번 로드되어 `Arc` 뒤에서 공유됩니다.
//!
//! # 아티팩트 형식
//! ```json
//! {
//!   "schema_version": 1,
//!   "anomaly": { "weights": [..8..], "bias": -4.0, "threshold": 0.5 },
//!   "threats": [
//!     { "threat_type": "brute_force", "weights": [..8..], "bias": 0.0 }
//!   ]
//! }
//! ```
//!
//! 로딩 시 검증: 스키마 버전 일치, 모든 가중치 벡터 차원 일치,
//! 위협 스테이지 1개 이상.

use std::path::Path;

use serde::{Deserialize, Serialize};

use logwarden_core::error::ModelError;
use logwarden_core::types::ThreatType;

use crate::features::{FEATURE_COUNT, FEATURE_SCHEMA_VERSION};

/// 선형 스테이지 하나의 가중치
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearStage {
    /// 특징별 가중치 (스키마 순서)
    pub weights: Vec<f64>,
    /// 절편
    pub bias: f64,
    /// 이상 판정 임계값 (시그모이드 출력 기준)
    pub threshold: f64,
}

/// 위협 유형 스테이지의 가중치
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatStage {
    /// 이 스테이지가 대표하는 위협 유형
    pub threat_type: ThreatType,
    /// 특징별 가중치 (스키마 순서)
    pub weights: Vec<f64>,
    /// 절편
    pub bias: f64,
}

/// 2단계 위협 분류 모델
///
/// 1단계: 이진 이상 판정 (로지스틱), 2단계: 위협 유형 argmax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatModel {
    /// 특징 스키마 버전
    pub schema_version: u32,
    /// 이상 판정 스테이지
    pub anomaly: LinearStage,
    /// 위협 유형 스테이지 목록
    pub threats: Vec<ThreatStage>,
}

impl ThreatModel {
    /// JSON 아티팩트 파일에서 모델을 로드합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ModelError::DecodeFailed {
                    reason: e.to_string(),
                }
            }
        })?;
        Self::from_json(&content)
    }

    /// JSON 문자열에서 모델을 파싱하고 검증합니다.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json).map_err(|e| ModelError::DecodeFailed {
            reason: e.to_string(),
        })?;
        model.validate()?;
        Ok(model)
    }

    /// 내장 기본 모델을 반환합니다.
    ///
    /// 키워드 특징에 큰 가중치를 두어 보안 관련 키워드가 있는 라인을
    /// 이상으로 판정하는 보수적 기본값입니다. 아티팩트 없이도 데모와
    /// 테스트가 돌아가도록 하기 위한 것이지 학습된 모델의 대체물이
    /// 아닙니다.
    pub fn builtin() -> Self {
        // 특징 순서: [length, contains_ip, hour, failed, connection, invalid, malicious, scan]
        Self {
            schema_version: FEATURE_SCHEMA_VERSION,
            anomaly: LinearStage {
                weights: vec![0.0, 1.0, 0.0, 3.0, 0.5, 2.0, 4.0, 3.0],
                bias: -4.0,
                threshold: 0.5,
            },
            threats: vec![
                ThreatStage {
                    threat_type: ThreatType::BruteForce,
                    weights: vec![0.0, 1.0, 0.0, 4.0, 0.0, 2.0, 0.0, 0.0],
                    bias: 0.0,
                },
                ThreatStage {
                    threat_type: ThreatType::PortScan,
                    weights: vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 5.0],
                    bias: 0.0,
                },
                ThreatStage {
                    threat_type: ThreatType::DosAttack,
                    weights: vec![0.01, 1.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0],
                    bias: 0.0,
                },
                ThreatStage {
                    threat_type: ThreatType::SuspiciousLogin,
                    weights: vec![0.0, 0.5, 0.1, 2.0, 0.0, 3.0, 0.0, 0.0],
                    bias: 0.0,
                },
                ThreatStage {
                    threat_type: ThreatType::MalwareActivity,
                    weights: vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 6.0, 0.0],
                    bias: 0.0,
                },
            ],
        }
    }

    /// 아티팩트 불변식을 검증합니다.
    fn validate(&self) -> Result<(), ModelError> {
        if self.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(ModelError::SchemaMismatch {
                model: self.schema_version,
                expected: FEATURE_SCHEMA_VERSION,
            });
        }

        if self.anomaly.weights.len() != FEATURE_COUNT {
            return Err(ModelError::InvalidShape {
                reason: format!(
                    "anomaly stage has {} weights, expected {}",
                    self.anomaly.weights.len(),
                    FEATURE_COUNT
                ),
            });
        }

        if self.threats.is_empty() {
            return Err(ModelError::InvalidShape {
                reason: "model must declare at least one threat stage".to_owned(),
            });
        }

        for stage in &self.threats {
            if stage.weights.len() != FEATURE_COUNT {
                return Err(ModelError::InvalidShape {
                    reason: format!(
                        "threat stage '{}' has {} weights, expected {}",
                        stage.threat_type,
                        stage.weights.len(),
                        FEATURE_COUNT
                    ),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_model_passes_validation() {
        let model = ThreatModel::builtin();
        model.validate().unwrap();
        assert_eq!(model.schema_version, FEATURE_SCHEMA_VERSION);
        assert_eq!(model.threats.len(), 5);
    }

    #[test]
    fn from_json_roundtrips_builtin() {
        let json = serde_json::to_string(&ThreatModel::builtin()).unwrap();
        let model = ThreatModel::from_json(&json).unwrap();
        assert_eq!(model.threats.len(), 5);
    }

    #[test]
    fn rejects_schema_version_mismatch() {
        let mut model = ThreatModel::builtin();
        model.schema_version = 99;
        let json = serde_json::to_string(&model).unwrap();
        let err = ThreatModel::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            ModelError::SchemaMismatch {
                model: 99,
                expected: FEATURE_SCHEMA_VERSION
            }
        ));
    }

    #[test]
    fn rejects_wrong_weight_dimension() {
        let mut model = ThreatModel::builtin();
        model.anomaly.weights.pop();
        let json = serde_json::to_string(&model).unwrap();
        assert!(matches!(
            ThreatModel::from_json(&json),
            Err(ModelError::InvalidShape { .. })
        ));
    }

    #[test]
    fn rejects_empty_threat_stages() {
        let mut model = ThreatModel::builtin();
        model.threats.clear();
        let json = serde_json::to_string(&model).unwrap();
        assert!(matches!(
            ThreatModel::from_json(&json),
            Err(ModelError::InvalidShape { .. })
        ));
    }

    #[test]
    fn rejects_garbage_json() {
        assert!(matches!(
            ThreatModel::from_json("{oops"),
            Err(ModelError::DecodeFailed { .. })
        ));
    }

    #[tokio::test]
    async fn from_file_missing_reports_not_found() {
        let err = ThreatModel::from_file("/nonexistent/model.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn from_file_loads_valid_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let json = serde_json::to_string(&ThreatModel::builtin()).unwrap();
        tokio::fs::write(&path, json).await.unwrap();
        let model = ThreatModel::from_file(&path).await.unwrap();
        assert_eq!(model.schema_version, FEATURE_SCHEMA_VERSION);
    }
}
