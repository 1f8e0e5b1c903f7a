//! Interpretação do evento de criação de objeto que dispara o ETL
//!
//! O payload é opaco para o host e chega como JSON no formato de
//! notificação de object storage: `Records[].s3.bucket.name` e
//! `Records[].s3.object.key`.

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{EventError, Result};

/// Notificação de criação de objeto
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectCreatedEvent {
    #[serde(rename = "Records")]
    pub records: Vec<ObjectRecord>,
}

/// Um registro da notificação
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

/// Par (bucket, chave) extraído do evento, com a chave já decodificada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceObject {
    pub bucket: String,
    pub key: String,
}

impl SourceObject {
    /// Caminho completo do objeto de origem
    pub fn path(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

/// Extrai (bucket, chave) do evento de gatilho
///
/// A chave chega codificada pela notificação (`+` no lugar de espaço,
/// `%3D` no lugar de `=`) e é decodificada exatamente uma vez. Registros
/// além do primeiro são ignorados com aviso estruturado. Um evento com
/// formato inesperado é erro fatal de integração, nunca retentado.
pub fn parse_object_event(event: &serde_json::Value) -> Result<SourceObject> {
    let parsed: ObjectCreatedEvent = serde_json::from_value(event.clone())
        .map_err(|e| EventError::Malformed(e.to_string()))?;

    if parsed.records.is_empty() {
        return Err(EventError::EmptyRecords.into());
    }

    if parsed.records.len() > 1 {
        warn!(
            ignored = parsed.records.len() - 1,
            "Evento com múltiplos registros; apenas o primeiro será processado"
        );
    }

    let record = parsed
        .records
        .into_iter()
        .next()
        .ok_or(EventError::EmptyRecords)?;

    let bucket = record.s3.bucket.name;
    let key = decode_key(&record.s3.object.key);

    info!(bucket = %bucket, key = %key, "Evento de objeto interpretado");

    Ok(SourceObject { bucket, key })
}

/// Decodifica a chave da notificação: `+` → espaço, `%3D` → `=`
fn decode_key(key: &str) -> String {
    key.replace('+', " ").replace("%3D", "=")
}
