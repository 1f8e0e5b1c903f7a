use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Representa uma linha de dados genérica
pub type DataRow = HashMap<String, DataValue>;

/// Valores de dados suportados
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Array(Vec<DataValue>),
    Object(HashMap<String, DataValue>),
    /// Data sem horário (YYYY-MM-DD)
    Date(NaiveDate),
    /// Data e horário sem timezone (YYYY-MM-DD HH:MM:SS)
    DateTime(NaiveDateTime),
    /// Timestamp com timezone UTC
    Timestamp(DateTime<Utc>),
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DataValue::String(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            DataValue::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            DataValue::Float(f) => {
                2u8.hash(state);
                // Para f64, convertemos para bits para hash
                f.to_bits().hash(state);
            }
            DataValue::Boolean(b) => {
                3u8.hash(state);
                b.hash(state);
            }
            DataValue::Null => {
                4u8.hash(state);
            }
            DataValue::Array(arr) => {
                5u8.hash(state);
                arr.hash(state);
            }
            DataValue::Object(obj) => {
                6u8.hash(state);
                // Para HashMap, ordenamos as chaves antes de fazer hash
                let mut sorted_keys: Vec<_> = obj.keys().collect();
                sorted_keys.sort();
                for key in sorted_keys {
                    key.hash(state);
                    obj[key].hash(state);
                }
            }
            DataValue::Date(date) => {
                7u8.hash(state);
                date.hash(state);
            }
            DataValue::DateTime(dt) => {
                8u8.hash(state);
                dt.hash(state);
            }
            DataValue::Timestamp(ts) => {
                9u8.hash(state);
                ts.hash(state);
            }
        }
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(value: NaiveDate) -> Self {
        DataValue::Date(value)
    }
}

impl DataValue {
    /// Converte para string se possível
    pub fn as_string(&self) -> Option<String> {
        match self {
            DataValue::String(s) => Some(s.clone()),
            DataValue::Integer(i) => Some(i.to_string()),
            DataValue::Float(f) => Some(f.to_string()),
            DataValue::Boolean(b) => Some(b.to_string()),
            DataValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            DataValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            DataValue::Timestamp(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            DataValue::Null => None,
            _ => None,
        }
    }

    /// Verifica se é nulo
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Converte um serde_json::Value para DataValue
    pub fn from_json(value: &serde_json::Value) -> DataValue {
        match value {
            serde_json::Value::String(s) => DataValue::String(s.clone()),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    DataValue::Float(f)
                } else {
                    DataValue::String(n.to_string())
                }
            }
            serde_json::Value::Bool(b) => DataValue::Boolean(*b),
            serde_json::Value::Null => DataValue::Null,
            serde_json::Value::Array(arr) => {
                let values: Vec<DataValue> = arr.iter().map(DataValue::from_json).collect();
                DataValue::Array(values)
            }
            serde_json::Value::Object(obj) => {
                let mut map = HashMap::new();
                for (key, value) in obj {
                    map.insert(key.clone(), DataValue::from_json(value));
                }
                DataValue::Object(map)
            }
        }
    }
}

/// Tabela em memória: a unidade de dados trocada entre extração,
/// transformação e carga
///
/// A verificação de vazio é sempre feita pelo predicado explícito
/// `is_empty`, nunca por truthiness implícita.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<DataRow>,
}

impl Table {
    /// Cria uma tabela vazia
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Cria uma tabela a partir de linhas existentes
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        Self { rows }
    }

    /// Número de linhas da tabela
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Verifica se a tabela não possui linhas
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Verifica se ao menos uma linha possui a coluna informada
    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(column))
    }

    /// Acesso de leitura às linhas
    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    /// Consome a tabela e devolve as linhas
    pub fn into_rows(self) -> Vec<DataRow> {
        self.rows
    }
}

impl IntoIterator for Table {
    type Item = DataRow;
    type IntoIter = std::vec::IntoIter<DataRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Sequência ordenada de destinos escritos por uma carga bem-sucedida
///
/// Devolvida ao chamador para fins de observabilidade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritePathSet(Vec<String>);

impl WritePathSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_paths(paths: Vec<String>) -> Self {
        Self(paths)
    }

    pub fn push(&mut self, path: impl Into<String>) {
        self.0.push(path.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl IntoIterator for WritePathSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Desfecho de uma execução do runner
///
/// "Sem dados" é um desfecho adjacente ao sucesso, nunca um erro:
/// nenhuma carga é tentada e o host recebe 204.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Carga concluída; carrega os caminhos escritos
    Success { paths: WritePathSet },
    /// Tabela vazia após a extração; nada a processar
    NoData,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, RunOutcome::NoData)
    }

    /// Mapeia o desfecho para o contrato de resposta do host
    pub fn into_response(self) -> HandlerResponse {
        match self {
            RunOutcome::Success { paths } => HandlerResponse {
                status_code: 200,
                body: serde_json::json!({
                    "message": "ETL bem sucedido.",
                    "path": paths.paths(),
                }),
            },
            RunOutcome::NoData => HandlerResponse {
                status_code: 204,
                body: serde_json::Value::String("Sem dados.".to_string()),
            },
        }
    }
}

/// Resposta entregue ao host que invocou o runner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: serde_json::Value,
}

/// Estágios de uma execução para rastreamento
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    ParsingEvent,
    Extracting,
    Transforming,
    Loading,
    Completed,
    Failed(String),
}

impl Default for RunStage {
    fn default() -> Self {
        RunStage::Idle
    }
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::Idle => write!(f, "Ocioso"),
            RunStage::ParsingEvent => write!(f, "Interpretando evento"),
            RunStage::Extracting => write!(f, "Extraindo"),
            RunStage::Transforming => write!(f, "Transformando"),
            RunStage::Loading => write!(f, "Carregando"),
            RunStage::Completed => write!(f, "Concluído"),
            RunStage::Failed(error) => write!(f, "Falhou: {}", error),
        }
    }
}

/// Eventos de execução para monitoramento externo
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Execução iniciada
    Started {
        run_id: String,
        timestamp: std::time::SystemTime,
    },
    /// Estágio alterado
    StageChanged {
        run_id: String,
        old_stage: RunStage,
        new_stage: RunStage,
        timestamp: std::time::SystemTime,
    },
    /// Execução terminou sem dados a processar
    NoData {
        run_id: String,
        timestamp: std::time::SystemTime,
    },
    /// Erro ocorreu
    Error {
        run_id: String,
        error: String,
        timestamp: std::time::SystemTime,
    },
    /// Execução concluída com carga
    Completed {
        run_id: String,
        paths: WritePathSet,
        timestamp: std::time::SystemTime,
    },
}
