//! 2단계 위협 분류기
//!
//! 1단계에서 특징 벡터에 대한 로지스틱 스코어로 정상/이상을 가르고,
//! 이상인 경우에만 2단계에서 위협 유형별 선형 스코어의 argmax로
//! 카테고리를 부여합니다.
//!
//! 분류는 동기이고 부수효과가 없으며 절대 에러를 내지 않습니다.
//! 스코어링 불일치(차원 변경 등)가 감지되면 이벤트를 버리는 대신
//! `unknown` 폴백 판정을 반환합니다.

use std::sync::Arc;

use tracing::warn;

use logwarden_core::types::ClassificationResult;

use crate::features::{FEATURE_COUNT, FeatureVector};
use crate::model::ThreatModel;

/// 위협 분류기
///
/// 읽기 전용 모델을 `Arc`로 감싸 스레드 간 공유합니다. 리로드 경로는
/// 없습니다. 새 모델은 프로세스 재시작으로 반영됩니다.
#[derive(Clone)]
pub struct Classifier {
    model: Arc<ThreatModel>,
}

impl Classifier {
    /// 검증된 모델로 분류기를 생성합니다.
    pub fn new(model: Arc<ThreatModel>) -> Self {
        Self { model }
    }

    /// 내장 기본 모델로 분류기를 생성합니다.
    pub fn with_builtin() -> Self {
        Self::new(Arc::new(ThreatModel::builtin()))
    }

    /// 특징 벡터를 분류합니다. 절대 실패하지 않습니다.
    pub fn classify(&self, features: &FeatureVector) -> ClassificationResult {
        let x = features.as_array();

        // 로딩 시 검증이 있지만 차원은 여기서도 확인합니다.
        // 불일치 시 에러 대신 폴백 판정으로 이벤트를 보존합니다.
        let Some(anomaly_score) = dot_sigmoid(
            &self.model.anomaly.weights,
            self.model.anomaly.bias,
            &x,
        ) else {
            warn!(
                expected = FEATURE_COUNT,
                actual = self.model.anomaly.weights.len(),
                "anomaly stage dimension mismatch, falling back"
            );
            return ClassificationResult::fallback();
        };

        if anomaly_score < self.model.anomaly.threshold {
            return ClassificationResult::normal(Some(1.0 - anomaly_score));
        }

        // 2단계: 위협 유형별 스코어 argmax
        let mut best = None;
        for stage in &self.model.threats {
            let Some(score) = dot_sigmoid(&stage.weights, stage.bias, &x) else {
                warn!(
                    threat_type = %stage.threat_type,
                    "threat stage dimension mismatch, falling back"
                );
                return ClassificationResult::fallback();
            };
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((stage.threat_type, score)),
            }
        }

        match best {
            Some((threat_type, score)) => ClassificationResult::anomaly(threat_type, Some(score)),
            // 로딩 검증이 빈 스테이지 목록을 거부하므로 도달하지 않음
            None => ClassificationResult::fallback(),
        }
    }
}

/// 가중 합 + 시그모이드. 차원이 맞지 않으면 None.
fn dot_sigmoid(weights: &[f64], bias: f64, x: &[f64; FEATURE_COUNT]) -> Option<f64> {
    if weights.len() != FEATURE_COUNT {
        return None;
    }
    let z: f64 = weights.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + bias;
    Some(1.0 / (1.0 + (-z).exp()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use logwarden_core::types::{Label, ThreatType};

    use crate::features::FeatureExtractor;
    use logwarden_core::types::{ParsedRecord, SourceFormat};

    fn features_for(raw: &str) -> FeatureVector {
        let extractor = FeatureExtractor::new();
        extractor.extract(&ParsedRecord::new(SourceFormat::Unrecognized, raw))
    }

    #[test]
    fn benign_line_classifies_normal() {
        let classifier = Classifier::with_builtin();
        let result = classifier.classify(&features_for("server started on port 8080"));
        assert_eq!(result.label, Label::Normal);
        assert_eq!(result.threat_type, ThreatType::Normal);
        assert!(result.confidence.is_some());
    }

    #[test]
    fn brute_force_line_classifies_as_brute_force() {
        let classifier = Classifier::with_builtin();
        let result = classifier.classify(&features_for(
            "Failed password for invalid user root from 10.0.0.5 port 22 ssh2",
        ));
        assert_eq!(result.label, Label::Anomaly);
        assert_eq!(result.threat_type, ThreatType::BruteForce);
        let confidence = result.confidence.unwrap();
        assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn scan_line_classifies_as_port_scan() {
        let classifier = Classifier::with_builtin();
        let result =
            classifier.classify(&features_for("port scan detected from 203.0.113.9"));
        assert_eq!(result.label, Label::Anomaly);
        assert_eq!(result.threat_type, ThreatType::PortScan);
    }

    #[test]
    fn malware_line_classifies_as_malware() {
        let classifier = Classifier::with_builtin();
        let result =
            classifier.classify(&features_for("malicious binary executed at /tmp/x"));
        assert_eq!(result.label, Label::Anomaly);
        assert_eq!(result.threat_type, ThreatType::MalwareActivity);
    }

    #[test]
    fn dimension_mismatch_yields_fallback() {
        let mut model = ThreatModel::builtin();
        model.anomaly.weights.pop();
        let classifier = Classifier::new(Arc::new(model));
        let result = classifier.classify(&features_for("anything"));
        assert_eq!(result, ClassificationResult::fallback());
    }

    #[test]
    fn threat_stage_mismatch_yields_fallback() {
        let mut model = ThreatModel::builtin();
        model.threats[0].weights.pop();
        let classifier = Classifier::new(Arc::new(model));
        let result = classifier.classify(&features_for(
            "Failed password for invalid user root from 10.0.0.5",
        ));
        assert_eq!(result, ClassificationResult::fallback());
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = Classifier::with_builtin();
        let features = features_for("connection flood from 10.1.1.1");
        assert_eq!(classifier.classify(&features), classifier.classify(&features));
    }

    #[test]
    fn empty_line_classifies_normal() {
        let classifier = Classifier::with_builtin();
        let result = classifier.classify(&features_for(""));
        assert_eq!(result.label, Label::Normal);
    }
}
