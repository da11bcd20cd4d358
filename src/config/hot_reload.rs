use std::path::Path;
use std::str::FromStr;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio_util::sync::CancellationToken;

use super::app_config::AppConfig;

/// Watches the config file and, on change, re-parses it and swaps only the
/// global log-level filter. Every other section is bound at process start
/// and never touched again — `worker.worker_num` in particular must not
/// change shard counts after the worker pools have been spawned.
pub async fn watch_log_level(path: String, cancel: CancellationToken) {
    let (tx, rx) = std_mpsc::channel();
    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(err) => {
            log::error!("config hot-reload watcher failed to start: {err}");
            return;
        }
    };

    if let Err(err) = watcher.watch(Path::new(&path), RecursiveMode::NonRecursive) {
        log::error!("config hot-reload failed to watch {path}: {err}");
        return;
    }

    loop {
        if cancel.is_cancelled() {
            return;
        }

        let event = tokio::task::block_in_place(|| rx.recv_timeout(Duration::from_millis(500)));
        match event {
            Ok(Ok(event)) if event.kind.is_modify() => apply_new_log_level(&path),
            Ok(Ok(_)) => {}
            Ok(Err(err)) => log::warn!("config hot-reload watch error: {err}"),
            Err(std_mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std_mpsc::RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn apply_new_log_level(path: &str) {
    match AppConfig::load(path) {
        Ok(config) => match log::LevelFilter::from_str(&config.log.level) {
            Ok(level) => {
                log::set_max_level(level);
                log::info!("hot-reloaded log level to {level}");
            }
            Err(_) => log::warn!("config hot-reload: invalid log level '{}'", config.log.level),
        },
        Err(err) => log::warn!("config hot-reload: re-parse failed, keeping current log level: {err}"),
    }
}
