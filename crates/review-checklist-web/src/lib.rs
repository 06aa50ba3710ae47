//! Wasm entry point: resolves the repository checklist and mounts it on the page.

use std::cell::RefCell;

use review_checklist::app::{AppSlot, ChecklistApp};
use review_checklist::config::{Config, Settings, resolve_config};
use review_checklist::page::HostError;
use review_checklist::platform::browser::{self, DomPage, GitilesFetcher, MutationWatcher};
use review_checklist::{log_error, log_info};
use wasm_bindgen::prelude::*;
use zoon::Task;

struct Running {
    _app: ChecklistApp<DomPage>,
    _watcher: MutationWatcher,
}

thread_local! {
    static INSTANCE: RefCell<AppSlot<Running>> = const { RefCell::new(AppSlot::new()) }; // ALLOWED: one checklist per page
}

#[wasm_bindgen(start)]
pub fn start() {
    launch();
}

/// Start the checklist on the current page. Only the first call does anything.
#[wasm_bindgen]
pub fn launch() {
    if let Err(error) = INSTANCE.with(|slot| slot.borrow_mut().reserve()) {
        log_info!("{error}");
        return;
    }
    Task::start(async {
        let settings = Settings::default();
        let location = browser::location_href().unwrap_or_else(|error| {
            log_error!("[Checklist] {error}");
            String::new()
        });
        let config = resolve_config(&GitilesFetcher::new(&settings), &settings, &location).await;
        match mount(&config, &settings) {
            Ok(running) => INSTANCE.with(|slot| slot.borrow_mut().install(running)),
            Err(error) => log_error!("[Checklist] Failed to start: {error}"),
        }
    });
}

fn mount(config: &Config, settings: &Settings) -> Result<Running, HostError> {
    let page = DomPage::detect()?;
    let mut watcher = MutationWatcher::on_body(&browser::document()?)?;
    let app = ChecklistApp::new(page, config, settings);
    app.attach(&mut watcher)?;
    Ok(Running {
        _app: app,
        _watcher: watcher,
    })
}
