//! Sistema de eventos para observabilidade das execuções

use async_trait::async_trait;
use crate::error::Result;
use crate::traits::EventEmitter;
use crate::types::RunEvent;
use tracing::{error, info};

/// Implementação simples de EventEmitter que logga eventos
#[derive(Debug, Clone, Default)]
pub struct LoggingEventEmitter;

impl LoggingEventEmitter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventEmitter for LoggingEventEmitter {
    async fn emit(&self, event: RunEvent) -> Result<()> {
        match event {
            RunEvent::Started { run_id, timestamp } => {
                info!(
                    run_id = %run_id,
                    timestamp = ?timestamp,
                    "Execução iniciada"
                );
            }
            RunEvent::StageChanged {
                run_id,
                old_stage,
                new_stage,
                timestamp,
            } => {
                info!(
                    run_id = %run_id,
                    old_stage = %old_stage,
                    new_stage = %new_stage,
                    timestamp = ?timestamp,
                    "Estágio da execução alterado"
                );
            }
            RunEvent::NoData { run_id, timestamp } => {
                info!(
                    run_id = %run_id,
                    timestamp = ?timestamp,
                    "Execução terminou sem dados a processar"
                );
            }
            RunEvent::Error {
                run_id,
                error,
                timestamp,
            } => {
                error!(
                    run_id = %run_id,
                    error = %error,
                    timestamp = ?timestamp,
                    "Erro na execução"
                );
            }
            RunEvent::Completed {
                run_id,
                paths,
                timestamp,
            } => {
                info!(
                    run_id = %run_id,
                    paths_written = paths.len(),
                    timestamp = ?timestamp,
                    "Execução concluída"
                );
            }
        }

        Ok(())
    }
}

/// EventEmitter que armazena eventos em memória para testes
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventEmitter {
    events: std::sync::Arc<std::sync::Mutex<Vec<RunEvent>>>,
}

impl InMemoryEventEmitter {
    pub fn new() -> Self {
        Self {
            events: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Retorna todos os eventos capturados
    pub fn get_events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Limpa todos os eventos armazenados
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Retorna o número de eventos capturados
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl EventEmitter for InMemoryEventEmitter {
    async fn emit(&self, event: RunEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
