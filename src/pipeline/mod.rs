use crate::config::LakeConfig;
use crate::error::{EtlError, LoadError, Result};
use crate::event::parse_object_event;
use crate::events::LoggingEventEmitter;
use crate::traits::{EventEmitter, Extractor, Loader, Transformer};
use crate::transform::common::CleanColumnTransform;
use crate::types::{HandlerResponse, RunEvent, RunOutcome, RunStage};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::SystemTime;

/// Runner ETL orientado a eventos
///
/// Conduz um evento de criação de objeto pelas etapas de extração,
/// transformação e carga, mapeando o desfecho para o contrato de resposta
/// do host. Cada invocação é independente: o runner não guarda estado
/// entre execuções e pode ser invocado concorrentemente para eventos
/// distintos.
pub struct EtlRunner<E, L> {
    extractor: E,
    loader: L,
    config: LakeConfig,
    event_emitter: Arc<dyn EventEmitter>,
    runner_id: String,
}

impl EtlRunner<(), ()> {
    /// Cria um novo builder de runner
    pub fn builder() -> EtlRunnerBuilder<(), ()> {
        EtlRunnerBuilder::new()
    }

    /// Cria um builder com configuração personalizada
    pub fn with_config(config: LakeConfig) -> EtlRunnerBuilder<(), ()> {
        EtlRunnerBuilder::with_config(config)
    }
}

impl<E, L> EtlRunner<E, L>
where
    E: Extractor + Send + Sync,
    L: Loader + Send + Sync,
{
    /// Retorna o ID do runner
    pub fn runner_id(&self) -> &str {
        &self.runner_id
    }

    /// Altera o estágio local da execução e emite evento
    async fn change_stage(&self, stage: &mut RunStage, new_stage: RunStage) -> Result<()> {
        let old_stage = std::mem::replace(stage, new_stage.clone());

        let event = RunEvent::StageChanged {
            run_id: self.runner_id.clone(),
            old_stage,
            new_stage,
            timestamp: SystemTime::now(),
        };

        self.event_emitter.emit(event).await?;
        Ok(())
    }

    /// Registra a falha de um estágio antes de propagá-la
    async fn fail_stage(&self, stage: &mut RunStage, error: &EtlError) -> Result<()> {
        self.change_stage(stage, RunStage::Failed(error.to_string()))
            .await?;

        let event = RunEvent::Error {
            run_id: self.runner_id.clone(),
            error: error.to_string(),
            timestamp: SystemTime::now(),
        };
        self.event_emitter.emit(event).await?;
        Ok(())
    }

    /// Executa o ETL para um evento de gatilho
    ///
    /// Sequência linear sem retorno a estágios anteriores: interpretar o
    /// evento, extrair, limpar pela coluna-chave e carregar. Tabela vazia
    /// após a extração termina a execução com o desfecho `NoData`, sem
    /// tentativa de carga. Qualquer falha de estágio propaga ao host.
    pub async fn run(&self, event: &serde_json::Value) -> Result<RunOutcome> {
        let mut stage = RunStage::Idle;

        self.event_emitter
            .emit(RunEvent::Started {
                run_id: self.runner_id.clone(),
                timestamp: SystemTime::now(),
            })
            .await?;

        tracing::info!(runner_id = %self.runner_id, "Iniciando execução do ETL");

        // Validações de saúde do destino
        if !self.loader.health_check().await? {
            let error = EtlError::Load(LoadError::DestinationConnection(
                "health check do destino falhou".to_string(),
            ));
            self.fail_stage(&mut stage, &error).await?;
            return Err(error);
        }

        // Etapa 1: interpretação do evento
        self.change_stage(&mut stage, RunStage::ParsingEvent).await?;

        let object = match parse_object_event(event) {
            Ok(object) => object,
            Err(e) => {
                self.fail_stage(&mut stage, &e).await?;
                return Err(e);
            }
        };

        // Etapa 2: extração
        self.change_stage(&mut stage, RunStage::Extracting).await?;

        tracing::info!(source = %object.path(), "Iniciando extração de dados");
        let table = match self.extractor.extract(&object).await {
            Ok(table) => {
                tracing::info!("Extraídos {} registros", table.len());
                table
            }
            Err(e) => {
                self.fail_stage(&mut stage, &e).await?;
                return Err(e);
            }
        };

        // Etapa 3: transformação
        self.change_stage(&mut stage, RunStage::Transforming).await?;

        if table.is_empty() {
            tracing::info!(source = %object.path(), "Sem dados a processar");
            self.event_emitter
                .emit(RunEvent::NoData {
                    run_id: self.runner_id.clone(),
                    timestamp: SystemTime::now(),
                })
                .await?;
            return Ok(RunOutcome::NoData);
        }

        let cleaner = CleanColumnTransform::new(&self.config.transform.key_column);
        let cleaned = match cleaner.transform(table).await {
            Ok(table) => {
                tracing::info!("Tabela limpa com {} registros", table.len());
                table
            }
            Err(e) => {
                self.fail_stage(&mut stage, &e).await?;
                return Err(e);
            }
        };

        // Etapa 4: carga
        self.change_stage(&mut stage, RunStage::Loading).await?;

        let request = self.config.load_request();
        let paths = match self.loader.load(cleaned, &request).await {
            Ok(paths) => {
                tracing::info!("Carregados {} destinos", paths.len());
                paths
            }
            Err(e) => {
                self.fail_stage(&mut stage, &e).await?;
                return Err(e);
            }
        };

        self.change_stage(&mut stage, RunStage::Completed).await?;

        self.event_emitter
            .emit(RunEvent::Completed {
                run_id: self.runner_id.clone(),
                paths: paths.clone(),
                timestamp: SystemTime::now(),
            })
            .await?;

        tracing::info!(
            runner_id = %self.runner_id,
            paths_written = paths.len(),
            "ETL executado com sucesso"
        );

        Ok(RunOutcome::Success { paths })
    }

    /// Executa o ETL e mapeia o desfecho para a resposta do host
    ///
    /// Sucesso vira 200 com a lista de caminhos; ausência de dados vira
    /// 204. Falhas propagam como `Err` para o host traduzir na sua
    /// própria superfície de erro.
    pub async fn handle(&self, event: &serde_json::Value) -> Result<HandlerResponse> {
        Ok(self.run(event).await?.into_response())
    }
}

/// Builder para criação de runners
pub struct EtlRunnerBuilder<E, L> {
    extractor: E,
    loader: L,
    config: LakeConfig,
    event_emitter: Option<Arc<dyn EventEmitter>>,
    _phantom: PhantomData<(E, L)>,
}

impl EtlRunnerBuilder<(), ()> {
    /// Cria um novo builder
    pub fn new() -> Self {
        Self {
            extractor: (),
            loader: (),
            config: LakeConfig::default(),
            event_emitter: None,
            _phantom: PhantomData,
        }
    }

    /// Cria um builder com configuração personalizada
    pub fn with_config(config: LakeConfig) -> Self {
        Self {
            extractor: (),
            loader: (),
            config,
            event_emitter: None,
            _phantom: PhantomData,
        }
    }
}

impl<E, L> EtlRunnerBuilder<E, L> {
    /// Define o extrator
    pub fn extract<NewE: Extractor + Send + Sync>(
        self,
        extractor: NewE,
    ) -> EtlRunnerBuilder<NewE, L> {
        EtlRunnerBuilder {
            extractor,
            loader: self.loader,
            config: self.config,
            event_emitter: self.event_emitter,
            _phantom: PhantomData,
        }
    }

    /// Define o carregador
    pub fn load<NewL: Loader + Send + Sync>(self, loader: NewL) -> EtlRunnerBuilder<E, NewL> {
        EtlRunnerBuilder {
            extractor: self.extractor,
            loader,
            config: self.config,
            event_emitter: self.event_emitter,
            _phantom: PhantomData,
        }
    }

    /// Define a configuração
    pub fn config(mut self, config: LakeConfig) -> Self {
        self.config = config;
        self
    }

    /// Define o event emitter
    pub fn event_emitter<T: EventEmitter + 'static>(mut self, emitter: T) -> Self {
        self.event_emitter = Some(Arc::new(emitter));
        self
    }
}

impl<E, L> EtlRunnerBuilder<E, L>
where
    E: Extractor + Send + Sync,
    L: Loader + Send + Sync,
{
    /// Constrói o runner
    pub fn build(self) -> EtlRunner<E, L> {
        EtlRunner {
            extractor: self.extractor,
            loader: self.loader,
            config: self.config,
            event_emitter: self
                .event_emitter
                .unwrap_or_else(|| Arc::new(LoggingEventEmitter::default())),
            runner_id: format!(
                "runner-{}-{}",
                std::process::id(),
                SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis()
            ),
        }
    }
}

impl Default for EtlRunnerBuilder<(), ()> {
    fn default() -> Self {
        Self::new()
    }
}
