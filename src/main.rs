use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tab_deck_lib::{InMemoryTabService, Settings, Tab, TabManager};

fn usage() -> ExitCode {
    eprintln!("usage: tab-deck <tabs.json> [query]");
    eprintln!("  tabs.json: array of {{id, windowId, index, title, url}}");
    eprintln!("  TAB_DECK_SETTINGS=<path> to load settings");
    ExitCode::from(2)
}

fn load_tabs(path: &Path) -> Result<Vec<Tab>, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        return usage();
    };
    let query = args.collect::<Vec<_>>().join(" ");

    let settings = std::env::var_os("TAB_DECK_SETTINGS")
        .map(|p| Settings::load(&PathBuf::from(p)))
        .unwrap_or_default();

    let tabs = match load_tabs(&path) {
        Ok(tabs) => tabs,
        Err(e) => {
            log::error!("[Main] {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = Arc::new(InMemoryTabService::from_tabs(tabs));
    let mut manager = TabManager::new(service, &settings);
    if let Err(e) = manager.refresh().await {
        log::error!("[Main] Failed to read tabs: {}", e);
        return ExitCode::FAILURE;
    }

    let groups = manager.visible_groups(&query);
    for group in &groups {
        println!("Window {} (id {}, {} tabs)", group.window_group_number, group.window_id, group.tabs.len());
        for tab in &group.tabs {
            let id = tab.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
            println!("  [{:>3}] #{:<6} {}  {}", tab.index, id, tab.title, tab.url);
        }
    }
    log::info!("[Main] {} windows shown", groups.len());
    ExitCode::SUCCESS
}
