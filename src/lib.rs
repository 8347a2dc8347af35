pub mod analysis;
pub mod api;
pub mod editor;
pub mod model;
pub mod registry;
pub mod render;
pub mod ui;
pub mod wizard;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod hotreload;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm_entry;

use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

pub use model::{AppConfig, AppPageSection, MenuTree, PageSectionsLayout, SectionKind, SectionType};
pub use render::{PageRenderOptions, RenderContext, RenderMode, render_page};
pub use ui::{TabState, Viewport, compose_sections};

use analysis::AnalysisResult;
use analysis::error::DiagnosticLevel;

pub const API_URL_ENV: &str = "PAGEKIT_API_URL";
pub const API_TOKEN_ENV: &str = "PAGEKIT_API_TOKEN";

// ========================================
// コマンドライン引数構造体
// ========================================

/// どのビューポートでプレビューを書き出すか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSelection {
    Mobile,
    Desktop,
    Both,
}

impl ViewportSelection {
    pub fn viewports(&self) -> Vec<Viewport> {
        match self {
            ViewportSelection::Mobile => vec![Viewport::Mobile],
            ViewportSelection::Desktop => vec![Viewport::Desktop],
            ViewportSelection::Both => Viewport::ALL.to_vec(),
        }
    }
}

/// コマンドライン引数の設定
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub page: Option<String>,
    pub viewports: ViewportSelection,
    pub mode: RenderMode,
    pub out_dir: PathBuf,
    pub enable_lint: bool,
    pub enable_hotreload: bool,
    pub open: bool,
    pub publish: bool,
    pub api_url: Option<String>,
    pub site: Option<String>,
    pub show_help: bool,
    pub quiet: bool, // panic以外のログを抑制
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config_path: None,
            page: None,
            viewports: ViewportSelection::Both,
            mode: RenderMode::ReadOnly,
            out_dir: PathBuf::from("dist"),
            enable_lint: true,
            enable_hotreload: false,
            open: false,
            publish: false,
            api_url: None,
            site: None,
            show_help: false,
            quiet: false,
            log_level: LogLevel::Info,
        }
    }
}

pub fn parse_args() -> Result<CliArgs, String> {
    let mut cli_args = parse_args_from(std::env::args().skip(1))?;
    if cli_args.publish && cli_args.api_url.is_none() {
        cli_args.api_url = std::env::var(API_URL_ENV).ok().filter(|v| !v.is_empty());
    }
    Ok(cli_args)
}

/// 引数列（プログラム名を除く）を解析する
pub fn parse_args_from<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli_args = CliArgs::default();

    for arg in args {
        let (flag, value) = match arg.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (arg.as_str(), None),
        };
        match (flag, value) {
            ("--no-lint", None) => cli_args.enable_lint = false,
            ("--lint", None) => cli_args.enable_lint = true,
            ("--hotreload", None) => cli_args.enable_hotreload = true,
            ("--no-hotreload", None) => cli_args.enable_hotreload = false,
            ("--open", None) => cli_args.open = true,
            ("--quiet" | "-q", None) => {
                cli_args.quiet = true;
                cli_args.log_level = LogLevel::Off;
            }
            ("--help" | "-h", None) => cli_args.show_help = true,
            ("--publish", url) => {
                cli_args.publish = true;
                cli_args.api_url = url.map(str::to_string);
            }
            ("--page", Some(page)) => cli_args.page = Some(page.to_string()),
            ("--site", Some(site)) => cli_args.site = Some(site.to_string()),
            ("--out", Some(dir)) => cli_args.out_dir = PathBuf::from(dir),
            ("--mode", Some(mode)) => cli_args.mode = mode.parse()?,
            ("--viewport", Some(v)) => {
                cli_args.viewports = match v {
                    "mobile" => ViewportSelection::Mobile,
                    "desktop" => ViewportSelection::Desktop,
                    "both" => ViewportSelection::Both,
                    other => return Err(format!("Unknown viewport '{}' (expected mobile/desktop/both)", other)),
                }
            }
            ("--width", Some(px)) => {
                let width: f32 = px.parse().map_err(|_| format!("Invalid width '{}'", px))?;
                cli_args.viewports = match Viewport::from_width(width) {
                    Viewport::Mobile => ViewportSelection::Mobile,
                    Viewport::Desktop => ViewportSelection::Desktop,
                };
            }
            ("--log-level", Some(level)) => {
                cli_args.log_level = match level {
                    "off" => LogLevel::Off,
                    "error" => LogLevel::Error,
                    "warn" => LogLevel::Warn,
                    "info" => LogLevel::Info,
                    "debug" => LogLevel::Debug,
                    "trace" => LogLevel::Trace,
                    other => return Err(format!("Unknown log level '{}'", other)),
                }
            }
            (positional, None) if !positional.starts_with('-') && cli_args.config_path.is_none() => {
                cli_args.config_path = Some(PathBuf::from(positional));
            }
            _ => return Err(format!("Unknown argument '{}'", arg)),
        }
    }
    Ok(cli_args)
}

pub fn show_help() {
    println!(
        "pagekit: render and publish site configurations

USAGE:
    pagekit <config.json> [OPTIONS]

OPTIONS:
    --page=KEY               Page to render (default: home, or the first page)
    --viewport=VIEWPORT      mobile/desktop/both (default: both)
    --width=PX               Pick the viewport from a window width
    --mode=MODE              view/edit (edit adds editor frames)
    --out=DIR                Output directory (default: dist)
    --lint/--no-lint         Enable/disable config checks (default: enabled)
    --hotreload              Re-render whenever the config changes
    --open                   Open the rendered page in a browser
    --publish[=URL]          Upload the config (URL defaults to ${})
    --site=SLUG              Site to publish to
    --quiet, -q              Suppress all logs except panics
    --log-level=LEVEL        Set log level (off/error/warn/info/debug/trace)
    --help, -h               Show this help

ENVIRONMENT:
    {}          API base URL for --publish
    {}        Bearer token for --publish
    RUST_LOG                 Log filter",
        API_URL_ENV, API_URL_ENV, API_TOKEN_ENV
    );
}

/// ログレベルを初期化する関数
pub fn init_logger(log_level: &LogLevel) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = match log_level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        };

        let mut builder = Builder::from_default_env();

        if matches!(log_level, LogLevel::Off) {
            builder
                .filter_level(LevelFilter::Off)
                .format(|_, _| Ok(()))
                .try_init()
                .ok();
        } else {
            builder
                .filter_level(level)
                .filter_module("notify", LevelFilter::Warn)
                .filter_module("reqwest", LevelFilter::Warn)
                .filter_module("hyper", LevelFilter::Warn)
                .filter_module("rustls", LevelFilter::Warn)
                .format_timestamp_secs()
                .try_init()
                .ok();
        }
    });
}

// ========================================
// 設定の読み込みと検査
// ========================================

/// 診断結果をログに出す。エラーがあれば true。
pub fn report_diagnostics(result: &AnalysisResult) -> bool {
    for diag in &result.diagnostics {
        let loc = diag.location.as_deref().unwrap_or("");
        let text = format!("{} {}", loc, diag.message);
        #[cfg(feature = "native")]
        let text = {
            use colored::*;
            match diag.level {
                DiagnosticLevel::Error => text.red().bold().to_string(),
                DiagnosticLevel::Warning => text.yellow().bold().to_string(),
                DiagnosticLevel::Info => text.blue().to_string(),
            }
        };
        match diag.level {
            DiagnosticLevel::Error => error!("[{}] {}", diag.level, text),
            DiagnosticLevel::Warning => warn!("[{}] {}", diag.level, text),
            DiagnosticLevel::Info => info!("[{}] {}", diag.level, text),
        }
    }
    let has_error = result.has_errors();
    if has_error {
        error!("Config errors found. Use --no-lint to skip checks.");
    }
    has_error
}

pub fn load_app_config<P: AsRef<Path>>(path: P, enable_lint: bool, quiet: bool) -> Result<AppConfig, String> {
    let config = AppConfig::from_file(&path)?;
    debug!(
        "Loaded '{}' from {} ({} pages)",
        config.name,
        path.as_ref().display(),
        config.pages.len()
    );

    if enable_lint && !quiet {
        report_diagnostics(&analysis::analyze_config(&config));
    }
    Ok(config)
}

/// 描画するページ（指定がなければ home、なければ最初のページ）
pub fn select_page<'a>(config: &'a AppConfig, requested: Option<&'a str>) -> Result<&'a str, String> {
    match requested {
        Some(key) if config.page(key).is_some() => Ok(key),
        Some(key) => Err(format!("Page '{}' is not defined in app config", key)),
        None if config.page("home").is_some() => Ok("home"),
        None => config
            .pages
            .keys()
            .next()
            .map(String::as_str)
            .ok_or_else(|| "App config has no pages".to_string()),
    }
}

/// <out>/<page>.<viewport>.html を書き出し、書いたパスを返す
pub fn render_previews(config: &AppConfig, cli_args: &CliArgs) -> Result<Vec<PathBuf>, String> {
    let page_key = select_page(config, cli_args.page.as_deref())?;
    std::fs::create_dir_all(&cli_args.out_dir)
        .map_err(|e| format!("Failed to create {}: {}", cli_args.out_dir.display(), e))?;

    let mut written = Vec::new();
    for viewport in cli_args.viewports.viewports() {
        let options = PageRenderOptions::new(RenderContext::new(viewport, cli_args.mode));
        let html = render_page(config, page_key, &options)?;
        let path = cli_args.out_dir.join(format!("{}.{}.html", page_key, viewport));
        std::fs::write(&path, html).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        info!("Rendered {} ({}) -> {}", page_key, viewport, path.display());
        written.push(path);
    }
    Ok(written)
}

// ========================================
// 実行
// ========================================

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub fn run(cli_args: &CliArgs) -> Result<(), String> {
    let path = cli_args
        .config_path
        .clone()
        .ok_or_else(|| "No config file given. See --help.".to_string())?;

    let config = load_app_config(&path, cli_args.enable_lint, cli_args.quiet)?;
    let written = render_previews(&config, cli_args)?;

    if cli_args.open {
        if let Some(first) = written.first() {
            open::that(first).map_err(|e| format!("Failed to open {}: {}", first.display(), e))?;
        }
    }

    if cli_args.publish {
        publish(&config, cli_args)?;
    }

    if cli_args.enable_hotreload {
        run_with_hotreload(path, cli_args.clone())?;
    }
    Ok(())
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub fn publish(config: &AppConfig, cli_args: &CliArgs) -> Result<(), String> {
    use api::{ConfigBackend, RestBackend};

    let url = cli_args
        .api_url
        .as_deref()
        .ok_or_else(|| format!("--publish needs a URL or {}", API_URL_ENV))?;
    let site = cli_args
        .site
        .as_deref()
        .ok_or_else(|| "--publish needs --site=SLUG".to_string())?;
    if cli_args.enable_lint && analysis::analyze_config(config).has_errors() {
        return Err("Refusing to publish a config with errors".to_string());
    }
    let token = std::env::var(API_TOKEN_ENV).ok().filter(|t| !t.is_empty());
    RestBackend::new(url, site, token).save(config)
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub fn run_with_hotreload(path: PathBuf, cli_args: CliArgs) -> Result<(), String> {
    use hotreload::HotReloader;

    let watch_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let hotreloader = HotReloader::new(&watch_dir)?;

    hotreloader.set_reload_callback(move || {
        match load_app_config(&path, cli_args.enable_lint, cli_args.quiet)
            .and_then(|config| render_previews(&config, &cli_args))
        {
            Ok(written) => info!("🔥 Re-rendered {} file(s)", written.len()),
            Err(e) => error!("Reload failed: {}", e),
        }
    });

    info!("Watching {} (Ctrl+C to stop)", watch_dir.display());
    loop {
        std::thread::park();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(list: &[&str]) -> Result<CliArgs, String> {
        parse_args_from(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args_defaults_and_flags() {
        let cli = args(&["site.json", "--page=about", "--viewport=mobile", "--mode=edit", "--no-lint"]).unwrap();
        assert_eq!(cli.config_path, Some(PathBuf::from("site.json")));
        assert_eq!(cli.page.as_deref(), Some("about"));
        assert_eq!(cli.viewports, ViewportSelection::Mobile);
        assert_eq!(cli.mode, RenderMode::Editable);
        assert!(!cli.enable_lint);
        assert_eq!(cli.out_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_parse_args_width_and_publish() {
        let cli = args(&["--width=1440", "--publish=https://api.example.com", "--site=shop", "-q"]).unwrap();
        assert_eq!(cli.viewports, ViewportSelection::Desktop);
        assert!(cli.publish);
        assert_eq!(cli.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(cli.log_level, LogLevel::Off);
        assert_eq!(args(&["--width=320"]).unwrap().viewports, ViewportSelection::Mobile);
    }

    #[test]
    fn test_parse_args_rejects_bad_values() {
        assert!(args(&["--viewport=tablet"]).is_err());
        assert!(args(&["--mode=draft"]).is_err());
        assert!(args(&["--bogus"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_select_page() {
        let config: AppConfig = serde_json::from_value(json!({
            "pages": { "about": { "sections": [] }, "blog": { "sections": [] } }
        }))
        .unwrap();
        assert_eq!(select_page(&config, None), Ok("about"));
        assert_eq!(select_page(&config, Some("blog")), Ok("blog"));
        assert!(select_page(&config, Some("home")).is_err());
        assert!(select_page(&AppConfig::default(), None).is_err());
    }

    #[test]
    fn test_render_previews_writes_one_file_per_viewport() {
        let config: AppConfig = serde_json::from_value(json!({
            "name": "Demo",
            "pages": { "home": { "sections": [{ "type": "markdown", "data": "# Hi" }] } }
        }))
        .unwrap();
        let out_dir = std::env::temp_dir().join(format!("pagekit-previews-{}", std::process::id()));
        let cli = CliArgs {
            out_dir: out_dir.clone(),
            ..Default::default()
        };
        let written = render_previews(&config, &cli).unwrap();
        assert_eq!(
            written,
            vec![out_dir.join("home.mobile.html"), out_dir.join("home.desktop.html")]
        );
        let html = std::fs::read_to_string(&written[1]).unwrap();
        assert!(html.contains("<h1>Hi</h1>"));
        let _ = std::fs::remove_dir_all(&out_dir);
    }
}
