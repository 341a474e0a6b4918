use crate::cli::Args;
use crate::client::{Auth, JiraConfig};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Scope-of-Work カスタムフィールドの既定id。設定・CLIで上書き可能。
pub const DEFAULT_SOW_FIELD_ID: &str = "customfield_10100";
pub const DEFAULT_MAX_WORKERS: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 実行1回分の設定。優先順位は CLI > 設定ファイル > 環境変数 > 既定値。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub verify_ssl: bool,
    pub ca_bundle: Option<PathBuf>,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub sow_field_id: String,
    pub max_workers: usize,
    pub timeout_secs: u64,
    pub out_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            verify_ssl: true,
            ca_bundle: None,
            http_proxy: None,
            https_proxy: None,
            start_date: String::new(),
            end_date: String::new(),
            sow_field_id: DEFAULT_SOW_FIELD_ID.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            out_path: None,
        }
    }
}

/// TOML設定ファイルの形。`[jira]` に接続情報、`[extract]` に抽出オプション。
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    jira: JiraSection,
    #[serde(default)]
    extract: ExtractSection,
}

#[derive(Debug, Default, Deserialize)]
struct JiraSection {
    base_url: Option<String>,
    email: Option<String>,
    api_token: Option<String>,
    verify_ssl: Option<bool>,
    ca_bundle: Option<String>,
    http_proxy: Option<String>,
    https_proxy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractSection {
    start_date: Option<String>,
    end_date: Option<String>,
    sow_field_id: Option<String>,
    // 数値以外が書かれていても設定ファイル全体を落とさず既定値へフォールバックする
    max_workers: Option<toml::Value>,
    timeout_secs: Option<u64>,
    out: Option<String>,
}

impl AppConfig {
    /// 設定ファイル（あれば）と環境変数から設定を組み立てる。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => read_file(p)?,
            None => FileConfig::default(),
        };
        let mut config = Self::from_file(file);
        config.apply_env();
        Ok(config)
    }

    fn from_file(file: FileConfig) -> Self {
        let defaults = Self::default();
        let max_workers = match file.extract.max_workers {
            Some(value) => match value.as_integer() {
                Some(n) if n > 0 => n as usize,
                _ => {
                    warn!(?value, "invalid max_workers in config, using default");
                    DEFAULT_MAX_WORKERS
                }
            },
            None => DEFAULT_MAX_WORKERS,
        };

        Self {
            base_url: file.jira.base_url.unwrap_or_default(),
            email: file.jira.email.unwrap_or_default(),
            api_token: file.jira.api_token.unwrap_or_default(),
            verify_ssl: file.jira.verify_ssl.unwrap_or(true),
            ca_bundle: file.jira.ca_bundle.filter(|s| !s.is_empty()).map(PathBuf::from),
            http_proxy: file.jira.http_proxy.filter(|s| !s.is_empty()),
            https_proxy: file.jira.https_proxy.filter(|s| !s.is_empty()),
            start_date: file.extract.start_date.unwrap_or_default(),
            end_date: file.extract.end_date.unwrap_or_default(),
            sow_field_id: file
                .extract
                .sow_field_id
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.sow_field_id),
            max_workers,
            timeout_secs: file.extract.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            out_path: file.extract.out.filter(|s| !s.is_empty()).map(PathBuf::from),
        }
    }

    /// 設定ファイルで埋まらなかった接続情報を環境変数から補う。
    fn apply_env(&mut self) {
        if self.base_url.is_empty() {
            if let Ok(value) = std::env::var("JIRA_BASE_URL") {
                self.base_url = value;
            }
        }
        if self.email.is_empty() {
            if let Ok(value) = std::env::var("JIRA_EMAIL") {
                self.email = value;
            }
        }
        if self.api_token.is_empty() {
            if let Ok(value) = std::env::var("JIRA_API_TOKEN") {
                self.api_token = value;
            }
        }
    }

    /// CLI引数で設定を上書きする（CLIが最優先）。
    pub fn apply_cli(&mut self, args: &Args) {
        if let Some(max_workers) = args.max_workers {
            self.max_workers = max_workers;
        }
        if let Some(timeout) = args.timeout {
            self.timeout_secs = timeout;
        }
        if args.insecure {
            self.verify_ssl = false;
        }
        if let Some(field_id) = &args.sow_field_id {
            if !field_id.is_empty() {
                self.sow_field_id = field_id.clone();
            }
        }
        if let Some(start) = &args.start_date {
            self.start_date = start.clone();
        }
        if let Some(end) = &args.end_date {
            self.end_date = end.clone();
        }
        if let Some(out) = &args.out {
            self.out_path = Some(out.clone());
        }
    }

    /// 必須の接続情報が揃っているか検証する。足りなければ設定エラー（終了コード2）。
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::ConfigurationMissing(
                "base_url is required (config [jira].base_url or JIRA_BASE_URL)".to_string(),
            ));
        }
        if self.email.is_empty() {
            return Err(Error::ConfigurationMissing(
                "email is required (config [jira].email or JIRA_EMAIL)".to_string(),
            ));
        }
        if self.api_token.is_empty() {
            return Err(Error::ConfigurationMissing(
                "api_token is required (config [jira].api_token or JIRA_API_TOKEN)".to_string(),
            ));
        }
        Ok(())
    }

    /// HTTPクライアント用の接続設定へ変換する。
    pub fn jira_config(&self) -> Result<JiraConfig> {
        self.validate()?;
        Ok(JiraConfig::new(
            self.base_url.clone(),
            Auth::Basic {
                email: self.email.clone(),
                api_token: self.api_token.clone(),
            },
        )?
        .verify_ssl(self.verify_ssl)
        .ca_bundle(self.ca_bundle.clone())
        .http_proxy(self.http_proxy.clone())
        .https_proxy(self.https_proxy.clone())
        .timeout(Duration::from_secs(self.timeout_secs)))
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidConfiguration(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    Ok(toml::from_str(&text)?)
}
