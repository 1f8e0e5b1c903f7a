use thiserror::Error;

/// Tipo Result principal da biblioteca
pub type Result<T> = std::result::Result<T, EtlError>;

/// Erro principal da biblioteca Lakeflow
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Erro de evento: {0}")]
    Event(#[from] EventError),

    #[error("Erro de extração: {0}")]
    Extract(#[from] ExtractError),

    #[error("Erro de transformação: {0}")]
    Transform(#[from] TransformError),

    #[error("Erro de carga: {0}")]
    Load(#[from] LoadError),

    #[error("Erro de requisição HTTP: {0}")]
    Fetch(#[from] FetchError),

    #[error("Erro de configuração: {0}")]
    Config(#[from] ConfigError),

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erro genérico: {0}")]
    Generic(#[from] anyhow::Error),
}

/// Erros relacionados ao evento de gatilho
///
/// Um evento malformado é um erro de integração entre o host e o runner,
/// nunca uma condição recuperável.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Evento malformado: {0}")]
    Malformed(String),

    #[error("Evento sem registros")]
    EmptyRecords,
}

/// Erros relacionados à extração de dados
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Erro de conexão: {0}")]
    Connection(String),

    #[error("Objeto não encontrado: {0}")]
    ObjectNotFound(String),

    #[error("Formato inválido: {0}")]
    InvalidFormat(String),

    #[error("Erro de parsing: {0}")]
    ParseError(String),

    #[error("Timeout na extração: {0}")]
    Timeout(String),
}

/// Erros relacionados à transformação de dados
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Coluna-chave ausente na tabela: {0}")]
    MissingColumn(String),

    #[error("Erro de processamento: {0}")]
    ProcessingError(String),
}

/// Erros relacionados ao carregamento de dados
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Erro de conexão de destino: {0}")]
    DestinationConnection(String),

    #[error("Erro de escrita: {0}")]
    WriteError(String),

    #[error("Coluna de partição ausente na tabela: {0}")]
    MissingPartitionColumn(String),

    #[error("Permissão negada: {0}")]
    PermissionDenied(String),
}

/// Erros relacionados às requisições HTTP do fetcher
///
/// Apenas o status 429 é retentado, com limite de tentativas. Qualquer
/// outro status de erro falha imediatamente com `HttpStatus`.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Erro HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Máximo de tentativas atingido ({max_attempts}) ao acessar {url}")]
    RetriesExhausted { url: String, max_attempts: usize },

    #[error("Erro de transporte: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Erros relacionados à configuração
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("Parâmetro obrigatório ausente: {0}")]
    MissingRequiredParameter(String),

    #[error("Valor inválido para {param}: {value}")]
    InvalidValue { param: String, value: String },

    #[error("Erro de parsing de configuração: {0}")]
    ParseError(String),
}

impl EtlError {
    /// Verifica se o erro é recuperável
    pub fn is_recoverable(&self) -> bool {
        match self {
            EtlError::Extract(ExtractError::Timeout(_)) => true,
            EtlError::Extract(ExtractError::Connection(_)) => true,
            EtlError::Load(LoadError::DestinationConnection(_)) => true,
            EtlError::Fetch(FetchError::RetriesExhausted { .. }) => true,
            _ => false,
        }
    }

    /// Retorna o código de erro
    pub fn error_code(&self) -> &'static str {
        match self {
            EtlError::Event(_) => "EVENT_ERROR",
            EtlError::Extract(_) => "EXTRACT_ERROR",
            EtlError::Transform(_) => "TRANSFORM_ERROR",
            EtlError::Load(_) => "LOAD_ERROR",
            EtlError::Fetch(_) => "FETCH_ERROR",
            EtlError::Config(_) => "CONFIG_ERROR",
            EtlError::Io(_) => "IO_ERROR",
            EtlError::Serialization(_) => "SERIALIZATION_ERROR",
            EtlError::Generic(_) => "GENERIC_ERROR",
        }
    }
}

impl From<config::ConfigError> for EtlError {
    fn from(err: config::ConfigError) -> Self {
        EtlError::Config(ConfigError::ParseError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = EtlError::Event(EventError::Malformed("sem Records".to_string()));
        assert_eq!(err.error_code(), "EVENT_ERROR");

        let err = EtlError::Fetch(FetchError::HttpStatus {
            status: 500,
            message: "internal".to_string(),
        });
        assert_eq!(err.error_code(), "FETCH_ERROR");
    }

    #[test]
    fn test_recoverable_classification() {
        let retries = EtlError::Fetch(FetchError::RetriesExhausted {
            url: "http://api.example.com".to_string(),
            max_attempts: 5,
        });
        assert!(retries.is_recoverable());

        let malformed = EtlError::Event(EventError::Malformed("shape".to_string()));
        assert!(!malformed.is_recoverable());

        let http = EtlError::Fetch(FetchError::HttpStatus {
            status: 403,
            message: "forbidden".to_string(),
        });
        assert!(!http.is_recoverable());
    }

    #[test]
    fn test_display_carries_context() {
        let err = EtlError::Fetch(FetchError::RetriesExhausted {
            url: "http://api.example.com/series".to_string(),
            max_attempts: 3,
        });
        let msg = err.to_string();
        assert!(msg.contains("http://api.example.com/series"));
        assert!(msg.contains('3'));
    }
}
