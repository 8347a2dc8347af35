use log::{debug, error, info, warn};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// 書き込み完了を待つ時間
const SETTLE_DELAY: Duration = Duration::from_millis(100);

type ReloadCallback = Box<dyn Fn() + Send + 'static>;

pub struct HotReloader {
    _watcher: RecommendedWatcher,
    reload_callback: Arc<Mutex<Option<ReloadCallback>>>,
}

impl HotReloader {
    /// watch_path 以下の .json 変更を監視する
    pub fn new<P: AsRef<Path>>(watch_path: P) -> Result<Self, String> {
        let watch_path = watch_path.as_ref();
        let (tx, rx): (Sender<notify::Result<Event>>, Receiver<notify::Result<Event>>) = mpsc::channel();

        let config = Config::default().with_poll_interval(Duration::from_millis(100));

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                if let Err(e) = tx.send(res) {
                    error!("Error sending watch event: {}", e);
                }
            },
            config,
        )
        .map_err(|e| format!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(watch_path, RecursiveMode::Recursive)
            .map_err(|e| format!("Failed to watch {}: {}", watch_path.display(), e))?;

        info!("🔥 Hot reload enabled for: {}", watch_path.display());

        let reload_callback: Arc<Mutex<Option<ReloadCallback>>> = Arc::new(Mutex::new(None));

        let callback_clone = Arc::clone(&reload_callback);
        thread::spawn(move || {
            loop {
                match rx.recv_timeout(Duration::from_millis(50)) {
                    Ok(Ok(event)) => {
                        if should_reload(&event) {
                            debug!("Changed: {:?}", event.paths);
                            info!("🔄 Config changed, re-rendering...");

                            thread::sleep(SETTLE_DELAY);
                            // 同じ保存で届いた残りのイベントは捨てる
                            while rx.try_recv().is_ok() {}

                            match callback_clone.lock() {
                                Ok(guard) => {
                                    if let Some(ref cb) = *guard {
                                        cb();
                                    }
                                }
                                Err(_) => warn!("Reload callback lock poisoned"),
                            }
                        }
                    }
                    Ok(Err(e)) => {
                        error!("Watch error: {:?}", e);
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        error!("Watcher disconnected");
                        break;
                    }
                }
            }
        });

        Ok(HotReloader {
            _watcher: watcher,
            reload_callback,
        })
    }

    /// リロード時のコールバック関数を設定
    pub fn set_reload_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + 'static,
    {
        match self.reload_callback.lock() {
            Ok(mut cb) => *cb = Some(Box::new(callback)),
            Err(_) => warn!("Reload callback lock poisoned; callback not set"),
        }
    }
}

/// 出力先の HTML などは無視し、設定 JSON の変更だけで再描画する
fn should_reload(event: &Event) -> bool {
    use notify::EventKind;

    match event.kind {
        EventKind::Modify(_) | EventKind::Create(_) => event.paths.iter().any(|path| is_config_file(path)),
        _ => false,
    }
}

fn is_config_file(path: &Path) -> bool {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let is_temp = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.') || n.ends_with(".tmp"))
        .unwrap_or(true);
    is_json && !is_temp
}
