use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use logwarden_core::config::LogwardenConfig;
use logwarden_core::metrics as metric_names;
use logwarden_core::pipeline::EventStore;
use logwarden_core::types::{Label, RawLogLine};
use logwarden_pipeline::{
    Classifier, IngestOutcome, IngestionOrchestrator, JsonlStore, MemoryStore, ThreatModel,
};

mod cli;
mod logging;
mod metrics_server;

use cli::DaemonCli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = DaemonCli::parse();

    // 설정 로드 + CLI 오버라이드
    let mut config = load_config(&args).await?;
    if let Some(level) = &args.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &args.log_format {
        config.general.log_format = format.clone();
    }
    config.validate()?;

    if args.validate {
        println!("configuration OK: {}", args.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    info!(version = env!("CARGO_PKG_VERSION"), "logwarden-daemon starting");

    // 메트릭 레코더 설치 (선택)
    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
        metrics::gauge!(metric_names::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION"))
            .set(1.0);
    }

    // 모델 로드: 아티팩트 경로가 없으면 내장 기본 모델
    let model = match &config.model.path {
        Some(path) => {
            info!(path, "loading model artifact");
            ThreatModel::from_file(path).await?
        }
        None => {
            info!("no model artifact configured, using builtin model");
            ThreatModel::builtin()
        }
    };
    let classifier = Classifier::new(Arc::new(model));

    // 저장소 백엔드 선택 (정적 디스패치)
    match config.store.backend.as_str() {
        "jsonl" => {
            let store = JsonlStore::new(&config.store.jsonl_path);
            info!(path = %config.store.jsonl_path, "using jsonl store backend");
            run(build_orchestrator(store, classifier, &config)?, &args, &config).await
        }
        _ => {
            let store = MemoryStore::new(config.store.memory_capacity);
            info!(
                capacity = config.store.memory_capacity,
                "using memory store backend"
            );
            run(build_orchestrator(store, classifier, &config)?, &args, &config).await
        }
    }
}

/// 설정 파일을 로드합니다. 기본 경로에 파일이 없으면 기본값으로 대체합니다.
async fn load_config(args: &DaemonCli) -> Result<LogwardenConfig> {
    if !args.config.exists() {
        let default_path = std::path::Path::new("/etc/logwarden/logwarden.toml");
        if args.config == default_path {
            let mut config = LogwardenConfig::default();
            config.apply_env_overrides();
            return Ok(config);
        }
        anyhow::bail!("config file not found: {}", args.config.display());
    }
    Ok(LogwardenConfig::load(&args.config).await?)
}

fn build_orchestrator<S: EventStore>(
    store: S,
    classifier: Classifier,
    config: &LogwardenConfig,
) -> Result<IngestionOrchestrator<S>> {
    IngestionOrchestrator::builder(store)
        .classifier(classifier)
        .max_line_bytes(config.ingest.max_line_bytes)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build orchestrator: {}", e))
}

async fn run<S: EventStore>(
    orchestrator: IngestionOrchestrator<S>,
    args: &DaemonCli,
    config: &LogwardenConfig,
) -> Result<()> {
    // 로깅 구독자: 허브에서 이벤트를 받아 구조화 로그로 남긴다
    let hub = orchestrator.hub();
    let (subscriber_id, mut events) = hub.subscribe(config.ingest.subscriber_capacity);
    let drain = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event.classification.label {
                Label::Anomaly => warn!(
                    event_id = %event.id,
                    source = %event.record.source,
                    threat_type = %event.classification.threat_type,
                    raw = event.raw(),
                    "anomaly detected"
                ),
                Label::Normal => info!(
                    event_id = %event.id,
                    source = %event.record.source,
                    "event ingested"
                ),
            }
        }
    });

    // 입력 소스: --input 파일 또는 stdin
    let reader: Box<dyn AsyncBufRead + Unpin> = match &args.input {
        Some(path) => {
            info!(path = %path.display(), "reading lines from file");
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        }
        None => {
            info!("reading lines from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
    };
    let mut lines = reader.lines();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
            maybe_line = lines.next_line() => {
                match maybe_line? {
                    Some(line) => {
                        // 저장소 실패는 해당 라인에만 치명적이고 데몬은 계속 돈다
                        match orchestrator.ingest(RawLogLine::new(line)).await {
                            Ok(IngestOutcome::Accepted(_)) | Ok(IngestOutcome::Rejected { .. }) => {}
                            Err(e) => error!(error = %e, "ingestion failed"),
                        }
                    }
                    None => {
                        info!("input exhausted");
                        break;
                    }
                }
            }
        }
    }

    // 허브에서 구독자를 내리고 드레인 태스크를 정리한다
    hub.unregister(subscriber_id);
    drain.abort();
    let _ = drain.await;

    let stats = orchestrator.stats();
    info!(
        accepted = stats.accepted,
        rejected = stats.rejected,
        unrecognized = stats.unrecognized,
        classifier_fallbacks = stats.classifier_fallbacks,
        store_failures = stats.store_failures,
        "logwarden-daemon shut down"
    );
    Ok(())
}
