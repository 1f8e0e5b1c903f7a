use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, EtlError};
use crate::extract::api::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_AFTER_SECS};
use crate::traits::LoadRequest;

/// Configuração principal do ETL de data lake
///
/// Substitui as constantes globais de implantação por uma estrutura
/// explícita passada ao runner na construção, permitindo testes com
/// fixtures independentes de qualquer ambiente.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LakeConfig {
    pub lake: LakeLayout,
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub fetch: FetchConfig,
}

/// Layout do data lake: bucket confiável e o template de chave
/// `area=<a>/source=<s>/table=<t>`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LakeLayout {
    pub trusted_bucket: String,
    pub area: String,
    pub source: String,
    pub table: String,
}

/// Configuração da etapa de transformação
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformConfig {
    /// Coluna-chave usada para remoção de nulos e deduplicação
    pub key_column: String,
}

/// Configuração da etapa de carga
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadConfig {
    pub partition_columns: Vec<String>,
    pub mode: WriteMode,
    pub catalog_database: Option<String>,
    pub catalog_table: Option<String>,
}

/// Configuração do fetcher HTTP
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    pub max_attempts: usize,
    /// Espera padrão, em segundos, quando o servidor não informa Retry-After
    pub default_backoff_secs: u64,
    pub timeout_seconds: u64,
}

/// Política de escrita no destino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Adiciona novos arquivos mantendo os existentes
    Append,
    /// Substitui todo o conteúdo do destino
    Overwrite,
    /// Substitui apenas as partições presentes na nova carga
    OverwritePartitions,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Append => write!(f, "append"),
            WriteMode::Overwrite => write!(f, "overwrite"),
            WriteMode::OverwritePartitions => write!(f, "overwrite_partitions"),
        }
    }
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            lake: LakeLayout::default(),
            transform: TransformConfig::default(),
            load: LoadConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Default for LakeLayout {
    fn default() -> Self {
        Self {
            trusted_bucket: "trusted".to_string(),
            area: String::new(),
            source: String::new(),
            table: String::new(),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            key_column: "dt".to_string(),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            partition_columns: vec!["dt".to_string()],
            mode: WriteMode::OverwritePartitions,
            catalog_database: None,
            catalog_table: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_backoff_secs: DEFAULT_RETRY_AFTER_SECS,
            timeout_seconds: 30,
        }
    }
}

impl LakeLayout {
    /// Chave do dataset no layout do lake
    pub fn key(&self) -> String {
        format!(
            "area={}/source={}/table={}",
            self.area, self.source, self.table
        )
    }

    /// Caminho completo da camada confiável
    pub fn trusted_path(&self) -> String {
        format!("s3://{}/{}", self.trusted_bucket, self.key())
    }
}

impl LakeConfig {
    /// Cria um novo builder para configuração
    pub fn builder() -> LakeConfigBuilder {
        LakeConfigBuilder::default()
    }

    /// Monta a requisição de carga derivada desta configuração
    pub fn load_request(&self) -> LoadRequest {
        LoadRequest {
            path: self.lake.trusted_path(),
            partition_columns: self.load.partition_columns.clone(),
            mode: self.load.mode,
            catalog_database: self.load.catalog_database.clone(),
            catalog_table: self.load.catalog_table.clone(),
        }
    }

    /// Carrega configuração do ambiente
    pub fn from_env() -> Result<Self, EtlError> {
        let mut builder = Self::builder();

        if let Ok(bucket) = std::env::var("LAKEFLOW_TRUSTED_BUCKET") {
            builder = builder.trusted_bucket(bucket);
        }

        if let Ok(area) = std::env::var("LAKEFLOW_AREA") {
            builder = builder.area(area);
        }

        if let Ok(source) = std::env::var("LAKEFLOW_SOURCE") {
            builder = builder.source(source);
        }

        if let Ok(table) = std::env::var("LAKEFLOW_TABLE") {
            builder = builder.table(table);
        }

        if let Ok(column) = std::env::var("LAKEFLOW_KEY_COLUMN") {
            builder = builder.key_column(column);
        }

        if let Ok(mode) = std::env::var("LAKEFLOW_WRITE_MODE") {
            let parsed = match mode.as_str() {
                "append" => WriteMode::Append,
                "overwrite" => WriteMode::Overwrite,
                "overwrite_partitions" => WriteMode::OverwritePartitions,
                other => {
                    return Err(EtlError::Config(ConfigError::InvalidValue {
                        param: "LAKEFLOW_WRITE_MODE".to_string(),
                        value: other.to_string(),
                    }))
                }
            };
            builder = builder.write_mode(parsed);
        }

        if let Ok(attempts) = std::env::var("LAKEFLOW_MAX_ATTEMPTS") {
            if let Ok(value) = attempts.parse::<usize>() {
                builder = builder.max_attempts(value);
            }
        }

        builder.build()
    }

    /// Carrega configuração de arquivo
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EtlError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;

        let parsed: LakeConfig = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), EtlError> {
        if self.transform.key_column.is_empty() {
            return Err(EtlError::Config(ConfigError::MissingRequiredParameter(
                "transform.key_column".to_string(),
            )));
        }

        if self.fetch.max_attempts == 0 {
            return Err(EtlError::Config(ConfigError::InvalidValue {
                param: "fetch.max_attempts".to_string(),
                value: "0".to_string(),
            }));
        }

        Ok(())
    }
}

/// Builder para criação de configurações
#[derive(Debug, Clone, Default)]
pub struct LakeConfigBuilder {
    config: LakeConfig,
}

impl LakeConfigBuilder {
    pub fn trusted_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.lake.trusted_bucket = bucket.into();
        self
    }

    pub fn area(mut self, area: impl Into<String>) -> Self {
        self.config.lake.area = area.into();
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.config.lake.source = source.into();
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.config.lake.table = table.into();
        self
    }

    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.config.transform.key_column = column.into();
        self
    }

    pub fn partition_columns(mut self, columns: Vec<String>) -> Self {
        self.config.load.partition_columns = columns;
        self
    }

    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.config.load.mode = mode;
        self
    }

    pub fn catalog_database(mut self, database: impl Into<String>) -> Self {
        self.config.load.catalog_database = Some(database.into());
        self
    }

    pub fn catalog_table(mut self, table: impl Into<String>) -> Self {
        self.config.load.catalog_table = Some(table.into());
        self
    }

    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.config.fetch.max_attempts = attempts;
        self
    }

    pub fn default_backoff_secs(mut self, secs: u64) -> Self {
        self.config.fetch.default_backoff_secs = secs;
        self
    }

    pub fn timeout_seconds(mut self, secs: u64) -> Self {
        self.config.fetch.timeout_seconds = secs;
        self
    }

    pub fn build(self) -> Result<LakeConfig, EtlError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusted_path_layout() {
        let config = LakeConfig::builder()
            .trusted_bucket("trusted")
            .area("example")
            .source("example_files")
            .table("example_table")
            .build()
            .unwrap();

        assert_eq!(
            config.lake.key(),
            "area=example/source=example_files/table=example_table"
        );
        assert_eq!(
            config.lake.trusted_path(),
            "s3://trusted/area=example/source=example_files/table=example_table"
        );
    }

    #[test]
    fn test_load_request_derivation() {
        let config = LakeConfig::builder()
            .trusted_bucket("trusted")
            .area("vendas")
            .source("api")
            .table("pedidos")
            .partition_columns(vec!["dt".to_string()])
            .write_mode(WriteMode::OverwritePartitions)
            .catalog_database("trusted")
            .catalog_table("pedidos")
            .build()
            .unwrap();

        let request = config.load_request();
        assert_eq!(
            request.path,
            "s3://trusted/area=vendas/source=api/table=pedidos"
        );
        assert_eq!(request.partition_columns, vec!["dt".to_string()]);
        assert_eq!(request.mode, WriteMode::OverwritePartitions);
        assert_eq!(request.catalog_database.as_deref(), Some("trusted"));
        assert_eq!(request.catalog_table.as_deref(), Some("pedidos"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = LakeConfig::builder().max_attempts(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_key_column_rejected() {
        let result = LakeConfig::builder().key_column("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lakeflow.toml");
        std::fs::write(
            &path,
            r#"
[lake]
trusted_bucket = "trusted"
area = "vendas"
source = "api"
table = "pedidos"

[transform]
key_column = "dt"

[load]
partition_columns = ["dt"]
mode = "overwrite_partitions"

[fetch]
max_attempts = 3
default_backoff_secs = 2
timeout_seconds = 10
"#,
        )
        .unwrap();

        let config = LakeConfig::from_file(&path).unwrap();
        assert_eq!(config.lake.area, "vendas");
        assert_eq!(config.load.mode, WriteMode::OverwritePartitions);
        assert_eq!(config.fetch.max_attempts, 3);
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("LAKEFLOW_TRUSTED_BUCKET", "confiavel");
        std::env::set_var("LAKEFLOW_WRITE_MODE", "append");

        let config = LakeConfig::from_env().unwrap();
        assert_eq!(config.lake.trusted_bucket, "confiavel");
        assert_eq!(config.load.mode, WriteMode::Append);

        std::env::remove_var("LAKEFLOW_TRUSTED_BUCKET");
        std::env::remove_var("LAKEFLOW_WRITE_MODE");
    }

    #[test]
    fn test_write_mode_serde_round_trip() {
        let json = serde_json::to_string(&WriteMode::OverwritePartitions).unwrap();
        assert_eq!(json, "\"overwrite_partitions\"");

        let parsed: WriteMode = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(parsed, WriteMode::Append);
    }
}
