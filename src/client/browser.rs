//! # Browser Session
//!
//! Thin WebDriver wrapper shared by the browser-driven clients. This is the
//! only module that talks to `thirtyfour`; page waits are bounded by the
//! configured element timeout.

use crate::config::WebDriverConfig;
use crate::error::{Result, SignBotError};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Extra browser options a client needs beyond the shared WebDriver config
#[derive(Debug, Clone, Default)]
pub struct BrowserProfile {
    /// Where the browser should drop downloaded files
    pub download_dir: Option<PathBuf>,
    /// Persistent profile directory (keeps logged-in sessions across runs)
    pub user_data_dir: Option<PathBuf>,
}

pub struct BrowserSession {
    system: &'static str,
    config: WebDriverConfig,
    profile: BrowserProfile,
    driver: Mutex<Option<WebDriver>>,
}

impl BrowserSession {
    pub fn new(system: &'static str, config: WebDriverConfig, profile: BrowserProfile) -> Self {
        Self {
            system,
            config,
            profile,
            driver: Mutex::new(None),
        }
    }

    pub fn system(&self) -> &'static str {
        self.system
    }

    /// Start a fresh browser, replacing any previous one
    pub async fn start(&self) -> Result<()> {
        let mut guard = self.driver.lock().await;
        if let Some(previous) = guard.take() {
            if let Err(e) = previous.quit().await {
                warn!(system = self.system, error = %e, "Failed to quit previous browser");
            }
        }

        let driver = WebDriver::new(self.config.server_url.as_str(), self.capabilities())
            .await
            .map_err(|e| SignBotError::session(self.system, format!("browser start failed: {e}")))?;
        *guard = Some(driver);

        info!(system = self.system, server = %self.config.server_url, "Browser session started");
        Ok(())
    }

    /// Quit the browser if one is running
    pub async fn quit(&self) -> Result<()> {
        if let Some(driver) = self.driver.lock().await.take() {
            driver.quit().await?;
            debug!(system = self.system, "Browser session closed");
        }
        Ok(())
    }

    pub async fn open(&self, url: &str) -> Result<()> {
        let driver = self.driver().await?;
        driver.goto(url).await?;
        Ok(())
    }

    /// Wait (bounded) for an element to appear
    pub async fn wait_for(&self, by: By) -> Result<WebElement> {
        self.wait_for_within(by, self.config.element_timeout()).await
    }

    pub async fn wait_for_within(&self, by: By, timeout: Duration) -> Result<WebElement> {
        let driver = self.driver().await?;
        let element = driver.query(by).wait(timeout, POLL_INTERVAL).first().await?;
        Ok(element)
    }

    pub async fn find(&self, by: By) -> Result<WebElement> {
        let driver = self.driver().await?;
        Ok(driver.find(by).await?)
    }

    /// Clear an input and type `value` into it
    pub async fn fill(&self, id: &str, value: &str) -> Result<()> {
        let element = self.find(By::Id(id)).await?;
        element.clear().await?;
        element.send_keys(value).await?;
        Ok(())
    }

    pub async fn click(&self, id: &str) -> Result<()> {
        self.find(By::Id(id)).await?.click().await?;
        Ok(())
    }

    /// Open a `<select>` and pick the option whose visible text matches
    pub async fn select_option(&self, select_id: &str, option_text: &str) -> Result<()> {
        self.click(select_id).await?;
        let xpath = format!(
            "//select[@id={}]/option[text()={}]",
            xpath_literal(select_id),
            xpath_literal(option_text)
        );
        self.find(By::XPath(xpath.as_str())).await?.click().await?;
        Ok(())
    }

    /// Feed a local file into an `<input type="file">`
    pub async fn attach_file(&self, input_id: &str, path: &Path) -> Result<()> {
        let absolute = std::fs::canonicalize(path)?;
        let input = self.wait_for(By::Id(input_id)).await?;
        input.send_keys(absolute.display().to_string()).await?;
        Ok(())
    }

    /// Cell texts of every body row of a table, header row skipped
    pub async fn table_rows(&self, table_id: &str) -> Result<Vec<Vec<String>>> {
        let table = self.wait_for(By::Id(table_id)).await?;
        let mut rows = Vec::new();
        for row in table.find_all(By::Tag("tr")).await?.into_iter().skip(1) {
            let mut cells = Vec::new();
            for cell in row.find_all(By::Tag("td")).await? {
                cells.push(cell.text().await?.trim().to_string());
            }
            rows.push(cells);
        }
        Ok(rows)
    }

    async fn driver(&self) -> Result<WebDriver> {
        self.driver
            .lock()
            .await
            .clone()
            .ok_or_else(|| SignBotError::session(self.system, "browser session not started"))
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec!["--no-sandbox".to_string(), "--disable-dev-shm-usage".to_string()];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }
        if let Some(dir) = &self.profile.user_data_dir {
            args.push(format!("--user-data-dir={}", dir.display()));
        }

        let mut chrome_options = json!({ "args": args });
        if let Some(dir) = &self.profile.download_dir {
            let absolute = std::path::absolute(dir).unwrap_or_else(|_| dir.clone());
            chrome_options["prefs"] = json!({
                "download.default_directory": absolute.display().to_string(),
                "download.prompt_for_download": false,
                "plugins.always_open_pdf_externally": true,
            });
        }

        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert("goog:chromeOptions".to_string(), chrome_options);
        caps
    }
}

/// Poll until `path` exists or `timeout` elapses
pub async fn wait_for_file(path: &Path, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Quote `text` as an XPath 1.0 string literal. Text holding both quote
/// kinds is split and rejoined with `concat()`.
pub(crate) fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text.split('\'').map(|part| format!("'{part}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_include_profile_options() {
        let session = BrowserSession::new(
            "test",
            WebDriverConfig::default(),
            BrowserProfile {
                download_dir: Some(PathBuf::from("/tmp/downloads")),
                user_data_dir: Some(PathBuf::from("/tmp/profile")),
            },
        );
        let caps = session.capabilities();
        let options = &caps["goog:chromeOptions"];
        let args: Vec<&str> = options["args"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();

        assert!(args.contains(&"--headless=new"));
        assert!(args.contains(&"--user-data-dir=/tmp/profile"));
        assert_eq!(options["prefs"]["download.default_directory"], "/tmp/downloads");
    }

    #[tokio::test]
    async fn test_operations_require_started_session() {
        let session = BrowserSession::new("test", WebDriverConfig::default(), BrowserProfile::default());
        let err = session.open("https://example.com").await.unwrap_err();
        assert!(matches!(err, SignBotError::Session { .. }));
        assert!(session.quit().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_file_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("contrato_1.pdf");
        assert!(!wait_for_file(&missing, Duration::from_secs(2)).await);

        std::fs::write(&missing, b"%PDF").unwrap();
        assert!(wait_for_file(&missing, Duration::from_secs(2)).await);
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("Diretoria"), "'Diretoria'");
        assert_eq!(xpath_literal("D'Avila"), "\"D'Avila\"");
        assert_eq!(
            xpath_literal(r#"Sala "A" d'Avila"#),
            r#"concat('Sala "A" d', "'", 'Avila')"#
        );
    }
}
