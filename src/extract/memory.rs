//! # Extração em memória
//!
//! Extrator com objetos pré-registrados em memória, útil para testes e
//! para pipelines exercitados sem credenciais de nuvem.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{ExtractError, Result};
use crate::event::SourceObject;
use crate::traits::Extractor;
use crate::types::Table;

/// Extrator que resolve objetos (bucket, chave) em tabelas registradas
#[derive(Debug, Clone, Default)]
pub struct MemoryExtractor {
    objects: HashMap<(String, String), Table>,
    fail_connection: bool,
}

impl MemoryExtractor {
    /// Cria um extrator sem objetos registrados
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra uma tabela para um par (bucket, chave)
    pub fn with_object(
        mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        table: Table,
    ) -> Self {
        self.objects.insert((bucket.into(), key.into()), table);
        self
    }

    /// Configura o extrator para falhar com erro de conexão
    pub fn failing() -> Self {
        Self {
            objects: HashMap::new(),
            fail_connection: true,
        }
    }
}

#[async_trait]
impl Extractor for MemoryExtractor {
    async fn extract(&self, object: &SourceObject) -> Result<Table> {
        if self.fail_connection {
            return Err(ExtractError::Connection(format!(
                "origem indisponível: {}",
                object.path()
            ))
            .into());
        }

        self.objects
            .get(&(object.bucket.clone(), object.key.clone()))
            .cloned()
            .ok_or_else(|| ExtractError::ObjectNotFound(object.path()).into())
    }
}
