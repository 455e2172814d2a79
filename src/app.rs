use std::sync::Arc;

use analyzer_api::{create_app, AppState};
use analyzer_application::{AnalysisOrchestrator, JobRegistry};
use analyzer_config::AppConfig;
use analyzer_dispatcher::{LlmAnalyzer, PromptTemplate};
use analyzer_domain::{RecordSource, ReviewAnalyzer, TextGenerator};
use analyzer_infrastructure::{GeminiGenerator, JsonlRecordSource};
use anyhow::{Context, Result};
use tokio::{net::TcpListener, sync::broadcast};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// 主应用程序
pub struct Application {
    config: AppConfig,
    state: AppState,
}

impl Application {
    /// 装配所有组件
    ///
    /// 缺少API密钥或提示词模板时直接失败，进程不会启动。
    pub async fn new(config: AppConfig, shutdown: CancellationToken) -> Result<Self> {
        info!("初始化应用程序");

        let api_key = config
            .generation
            .api_key()
            .context("读取生成服务API密钥失败")?;
        let template = PromptTemplate::load(&config.generation.prompt_path)
            .await
            .context("加载提示词模板失败")?;
        let generator: Arc<dyn TextGenerator> =
            Arc::new(GeminiGenerator::new(&config.generation, api_key)?);

        let analyzer: Arc<dyn ReviewAnalyzer> = Arc::new(LlmAnalyzer::from_config(
            generator,
            template,
            &config.analysis,
        ));
        let record_source: Arc<dyn RecordSource> =
            Arc::new(JsonlRecordSource::new(&config.records.path));

        Ok(Self::with_components(config, record_source, analyzer, shutdown))
    }

    /// 使用给定的记录源和分析器装配应用
    pub fn with_components(
        config: AppConfig,
        record_source: Arc<dyn RecordSource>,
        analyzer: Arc<dyn ReviewAnalyzer>,
        shutdown: CancellationToken,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let orchestrator = Arc::new(
            AnalysisOrchestrator::new(registry, Arc::clone(&record_source), analyzer)
                .with_shutdown(shutdown),
        );

        info!(
            chunk_size = config.analysis.chunk_size,
            worker_count = config.analysis.worker_count,
            requests_per_period = config.analysis.requests_per_period,
            "分析流水线已就绪"
        );

        Self {
            state: AppState::new(orchestrator, record_source),
            config,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// 绑定监听地址，地址被占用等错误在这里直接返回
    pub async fn bind(&self) -> Result<TcpListener> {
        let bind_address = &self.config.api.bind_address;
        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;
        info!("API服务器启动在 http://{}", bind_address);
        Ok(listener)
    }

    /// 在已绑定的监听器上运行API服务器直到收到关闭信号
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let app = create_app(self.state.clone(), &self.config.api);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }
}
