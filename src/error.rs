use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Report write failed: {0}")]
    ReportWrite(#[from] csv::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// 接続レベルの失敗（TLSハンドシェイク失敗を含む）かどうかを判定。
    /// この種のエラーはリトライ対象外で、検索・フィールドカタログ呼び出しでは致命的扱い。
    pub fn is_connection_failure(&self) -> bool {
        match self {
            Error::RequestFailed(err) => err.is_connect(),
            _ => false,
        }
    }

    /// エラーカテゴリごとのプロセス終了コード。
    /// 2 = 設定エラー、3 = 検索・接続エラー、4 = レポート出力エラー。
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfiguration(_)
            | Error::ConfigurationMissing(_)
            | Error::ConfigFile(_) => 2,
            Error::RequestFailed(_) | Error::ApiError { .. } | Error::JsonParsing(_) => 3,
            Error::IoError(_) | Error::ReportWrite(_) => 4,
            Error::Unexpected(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
