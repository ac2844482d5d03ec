//! 통합 테스트 -- 수집 파이프라인 전체 흐름 검증
//!
//! 원시 라인 하나가 파싱, 분류, 영속화, 방송을 거치는 경로를
//! 실제 협력자 조합으로 검증합니다.

use logwarden_core::types::{Label, RawLogLine, SourceFormat, ThreatType};
use logwarden_core::EventStore;
use logwarden_pipeline::{
    Classifier, IngestOutcome, IngestionOrchestrator, JsonlStore, MemoryStore, ThreatModel,
};

use std::sync::Arc;

fn memory_orchestrator() -> IngestionOrchestrator<MemoryStore> {
    IngestionOrchestrator::builder(MemoryStore::new(1000))
        .build()
        .expect("default orchestrator builds")
}

/// 브루트포스 syslog 라인의 전체 경로 검증
#[tokio::test]
async fn brute_force_syslog_line_end_to_end() {
    let orch = memory_orchestrator();
    let hub = orch.hub();
    let (_id, mut rx) = hub.subscribe(8);

    let line = "Jun 15 04:06:20 host sshd[1234]: Failed password for invalid user root from 10.0.0.5 port 22 ssh2";
    let outcome = orch.ingest(RawLogLine::new(line)).await.unwrap();

    let IngestOutcome::Accepted(event) = outcome else {
        panic!("expected acceptance");
    };

    // 파싱 결과
    assert_eq!(event.record.source, SourceFormat::Syslog);
    assert_eq!(event.record.host.as_deref(), Some("host"));
    assert_eq!(event.record.process.as_deref(), Some("sshd"));

    // 분류 결과
    assert_eq!(event.classification.label, Label::Anomaly);
    assert_eq!(event.classification.threat_type, ThreatType::BruteForce);

    // 영속화된 문서 형태
    let docs = orch.store().recent(1).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["raw"], line);
    assert_eq!(docs[0]["prediction"], "anomaly");
    assert_eq!(docs[0]["threat_type"], "brute_force");

    // 방송 전달
    let delivered = rx.recv().await.unwrap();
    assert_eq!(delivered.id, event.id);
    assert_eq!(delivered.raw(), line);
}

/// 정상 JSON 라인 시나리오
#[tokio::test]
async fn benign_json_line_classifies_normal() {
    let orch = memory_orchestrator();
    let line = r#"{"timestamp":"2025-06-16T10:00:00","level":"INFO","msg":"ok"}"#;

    let outcome = orch.ingest(RawLogLine::new(line)).await.unwrap();
    let IngestOutcome::Accepted(event) = outcome else {
        panic!("expected acceptance");
    };

    assert_eq!(event.record.source, SourceFormat::Json);
    assert_eq!(event.record.level.as_deref(), Some("INFO"));
    assert_eq!(event.record.message.as_deref(), Some("ok"));
    assert_eq!(event.classification.label, Label::Normal);

    let docs = orch.store().recent(1).await.unwrap();
    assert_eq!(docs[0]["prediction"], "normal");
    assert_eq!(docs[0]["threat_type"], "normal");
}

/// 미인식 라인도 원문 보존과 함께 수락됨
#[tokio::test]
async fn unrecognized_line_is_preserved_verbatim() {
    let orch = memory_orchestrator();
    let line = "  @@@ completely unstructured noise \t ";

    let outcome = orch.ingest(RawLogLine::new(line)).await.unwrap();
    let IngestOutcome::Accepted(event) = outcome else {
        panic!("expected acceptance");
    };

    assert_eq!(event.record.source, SourceFormat::Unrecognized);
    assert_eq!(event.raw(), line);
    let docs = orch.store().recent(1).await.unwrap();
    assert_eq!(docs[0]["raw"], line);
}

/// N개 라인 배치는 N번 영속화와 N번 전달을 낳음
#[tokio::test]
async fn batch_of_n_lines_persists_and_delivers_n_events() {
    let orch = memory_orchestrator();
    let hub = orch.hub();
    let (_id, mut rx) = hub.subscribe(16);

    let body = "\
Jun 15 04:06:20 host sshd[1]: accepted publickey for deploy
Jun 15 04:06:21 host sshd[2]: Failed password for invalid user root from 10.0.0.5
{\"timestamp\":\"2025-06-16T10:00:00\",\"level\":\"INFO\",\"msg\":\"ok\"}
plain unstructured line";

    let report = orch.ingest_batch(body).await.unwrap();
    assert_eq!(report.submitted, 4);
    assert_eq!(report.accepted, 4);
    assert_eq!(report.skipped, 0);

    assert_eq!(orch.store().recent(100).await.unwrap().len(), 4);
    for _ in 0..4 {
        assert!(rx.recv().await.is_some());
    }
    assert!(rx.try_recv().is_err());
}

/// 구독자 생명주기: 등록, 수신, 해지, 수신 중단
#[tokio::test]
async fn subscriber_lifecycle_through_ingestion() {
    let orch = memory_orchestrator();
    let hub = orch.hub();

    let (id, mut rx) = hub.subscribe(8);
    assert_eq!(hub.subscriber_count(), 1);

    orch.ingest(RawLogLine::new("first line")).await.unwrap();
    assert!(rx.recv().await.is_some());

    assert!(hub.unregister(id));
    assert_eq!(hub.subscriber_count(), 0);

    orch.ingest(RawLogLine::new("second line")).await.unwrap();
    // 해지 이후에는 전달되지 않음
    assert!(rx.try_recv().is_err());
}

/// JSONL 저장소 백엔드로 전체 경로 검증
#[tokio::test]
async fn jsonl_backend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlStore::new(dir.path().join("events.jsonl"));
    let orch = IngestionOrchestrator::builder(store).build().unwrap();

    orch.ingest_batch(
        "Jun 15 04:06:20 host sshd[9]: Failed password for invalid user admin from 10.0.0.7\nok line",
    )
    .await
    .unwrap();

    let docs = orch.store().recent(10).await.unwrap();
    assert_eq!(docs.len(), 2);
    for doc in &docs {
        assert!(doc["timestamp"].as_str().is_some());
        assert!(doc["ingested_at"].as_str().is_some());
    }
}

/// 아티팩트에서 로드한 모델로 오케스트레이터 구성
#[tokio::test]
async fn orchestrator_with_model_from_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let json = serde_json::to_string(&ThreatModel::builtin()).unwrap();
    tokio::fs::write(&path, json).await.unwrap();

    let model = ThreatModel::from_file(&path).await.unwrap();
    let orch = IngestionOrchestrator::builder(MemoryStore::new(10))
        .classifier(Classifier::new(Arc::new(model)))
        .build()
        .unwrap();

    let outcome = orch
        .ingest(RawLogLine::new("port scan detected from 203.0.113.9"))
        .await
        .unwrap();
    let IngestOutcome::Accepted(event) = outcome else {
        panic!("expected acceptance");
    };
    assert_eq!(event.classification.threat_type, ThreatType::PortScan);
}

/// 여러 오케스트레이터가 하나의 허브를 공유할 수 있음
#[tokio::test]
async fn shared_hub_across_orchestrators() {
    let hub = Arc::new(logwarden_pipeline::BroadcastHub::new());
    let orch_a = IngestionOrchestrator::builder(MemoryStore::new(10))
        .hub(Arc::clone(&hub))
        .build()
        .unwrap();
    let orch_b = IngestionOrchestrator::builder(MemoryStore::new(10))
        .hub(Arc::clone(&hub))
        .build()
        .unwrap();

    let (_id, mut rx) = hub.subscribe(8);
    orch_a.ingest(RawLogLine::new("from a")).await.unwrap();
    orch_b.ingest(RawLogLine::new("from b")).await.unwrap();

    let raws: Vec<String> = vec![
        rx.recv().await.unwrap().raw().to_owned(),
        rx.recv().await.unwrap().raw().to_owned(),
    ];
    assert!(raws.contains(&"from a".to_owned()));
    assert!(raws.contains(&"from b".to_owned()));
}
