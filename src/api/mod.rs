// ========================================
// AppConfig の永続化
// ========================================
//
// 保存は常にドキュメント全体を送る。部分更新や競合検出はなく、最後の書き込みが勝つ。

use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::model::app_config::AppConfig;

pub trait ConfigBackend {
    fn save(&self, config: &AppConfig) -> Result<(), String>;
    fn load(&self) -> Result<AppConfig, String>;
}

// ========================================
// ファイル
// ========================================

/// JSONファイルに保存する（一時ファイル経由で置き換え）
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigBackend for FileBackend {
    fn save(&self, config: &AppConfig) -> Result<(), String> {
        let json = config.to_json_pretty()?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json).map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| format!("Failed to replace {}: {}", self.path.display(), e))?;
        info!("Saved app config to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<AppConfig, String> {
        AppConfig::from_file(&self.path)
    }
}

// ========================================
// メモリ（プレビュー・ブラウザ用）
// ========================================

#[derive(Debug, Default)]
pub struct MemoryBackend {
    stored: Mutex<Option<AppConfig>>,
}

impl MemoryBackend {
    pub fn new(initial: Option<AppConfig>) -> Self {
        Self {
            stored: Mutex::new(initial),
        }
    }
}

impl ConfigBackend for MemoryBackend {
    fn save(&self, config: &AppConfig) -> Result<(), String> {
        let mut stored = self.stored.lock().map_err(|_| "Config store lock poisoned".to_string())?;
        *stored = Some(config.clone());
        debug!("Stored app config '{}' in memory", config.name);
        Ok(())
    }

    fn load(&self) -> Result<AppConfig, String> {
        self.stored
            .lock()
            .map_err(|_| "Config store lock poisoned".to_string())?
            .clone()
            .ok_or_else(|| "No app config has been saved yet".to_string())
    }
}

// ========================================
// REST
// ========================================

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub use rest::RestBackend;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
mod rest {
    use super::ConfigBackend;
    use crate::model::app_config::AppConfig;
    use log::{debug, info};
    use std::time::Duration;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// 管理APIに対して PUT/GET する。リトライはしない。
    #[derive(Debug, Clone)]
    pub struct RestBackend {
        base_url: String,
        site: String,
        token: Option<String>,
    }

    impl RestBackend {
        pub fn new(base_url: &str, site: &str, token: Option<String>) -> Self {
            Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                site: site.to_string(),
                token,
            }
        }

        pub fn config_url(&self) -> String {
            format!("{}/site/{}/config", self.base_url, self.site)
        }

        fn client() -> Result<reqwest::Client, String> {
            reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| format!("HTTP client build failed: {}", e))
        }

        fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, String> {
            let rt = tokio::runtime::Runtime::new().map_err(|e| format!("Failed to start runtime: {}", e))?;
            Ok(rt.block_on(future))
        }

        fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
            match &self.token {
                Some(token) => request.bearer_auth(token),
                None => request,
            }
        }

        async fn put(&self, body: String) -> Result<(), String> {
            let url = self.config_url();
            debug!("PUT {} ({} bytes)", url, body.len());
            let response = self
                .authorize(Self::client()?.put(&url))
                .header("content-type", "application/json")
                .body(body)
                .send()
                .await
                .map_err(|e| format!("PUT {} failed: {}", url, e))?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(format!("PUT {} returned {}: {}", url, status, text));
            }
            Ok(())
        }

        async fn get(&self) -> Result<String, String> {
            let url = self.config_url();
            debug!("GET {}", url);
            let response = self
                .authorize(Self::client()?.get(&url))
                .send()
                .await
                .map_err(|e| format!("GET {} failed: {}", url, e))?;
            let status = response.status();
            let text = response.text().await.map_err(|e| format!("GET {} body: {}", url, e))?;
            if !status.is_success() {
                return Err(format!("GET {} returned {}: {}", url, status, text));
            }
            Ok(text)
        }
    }

    impl ConfigBackend for RestBackend {
        fn save(&self, config: &AppConfig) -> Result<(), String> {
            let body = serde_json::to_string(config).map_err(|e| format!("Failed to serialize app config: {}", e))?;
            Self::block_on(self.put(body))??;
            info!("Published app config to {}", self.config_url());
            Ok(())
        }

        fn load(&self) -> Result<AppConfig, String> {
            let text = Self::block_on(self.get())??;
            AppConfig::from_json(&text)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_config_url_trims_trailing_slash() {
            let backend = RestBackend::new("https://api.example.com/v1/", "my-shop", None);
            assert_eq!(backend.config_url(), "https://api.example.com/v1/site/my-shop/config");
        }
    }
}
