//! The application object: one per page load.
//!
//! [`ChecklistApp`] owns the checklist model and the sync controller and routes every
//! [`SyncEvent`] to them. Callbacks handed to the page, the watcher and the model only
//! hold weak references to the application, so dropping the app makes them inert.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::checklist::ChecklistModel;
use crate::config::{Config, Settings};
use crate::page::{HostError, Page};
use crate::sync::{EventSink, SyncController, SyncEvent};
use crate::watcher::ChangeWatcher;

pub struct ChecklistApp<P: Page + 'static> {
    inner: Rc<AppInner<P>>,
}

struct AppInner<P: Page> {
    model: RefCell<ChecklistModel>,
    controller: RefCell<SyncController<P>>,
}

impl<P: Page + 'static> ChecklistApp<P> {
    pub fn new(page: P, config: &Config, settings: &Settings) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<AppInner<P>>| {
            let events: EventSink = Rc::new({
                let weak = weak.clone();
                move |event: SyncEvent| {
                    if let Some(inner) = weak.upgrade() {
                        inner.dispatch(event);
                    }
                }
            });

            let mut model = ChecklistModel::new(config.items.iter().cloned(), config.default_status);
            model.on_change({
                let weak = weak.clone();
                move |model: &ChecklistModel| {
                    if let Some(inner) = weak.upgrade() {
                        let summary = model.summarize();
                        inner.with_controller(|controller| controller.on_checklist_changed(&summary));
                    }
                }
            });

            let controller = SyncController::new(page, events)
                .salvage_draft_on_rebind(settings.salvage_draft_on_rebind);
            AppInner {
                model: RefCell::new(model),
                controller: RefCell::new(controller),
            }
        });
        log_info!("Gerrit review checklist added!");
        Self { inner }
    }

    /// Observe the document through `watcher` and run a first observation right away,
    /// in case the review panel is already open.
    pub fn attach(&self, watcher: &mut impl ChangeWatcher) -> Result<(), HostError> {
        let weak = Rc::downgrade(&self.inner);
        watcher.watch(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.dispatch(SyncEvent::DomChanged);
            }
        }))?;
        self.dispatch(SyncEvent::DomChanged);
        Ok(())
    }

    pub fn dispatch(&self, event: SyncEvent) {
        self.inner.dispatch(event);
    }

    pub fn model(&self) -> Ref<'_, ChecklistModel> {
        self.inner.model.borrow()
    }

    pub fn inspect<R>(&self, f: impl FnOnce(&SyncController<P>) -> R) -> R {
        f(&self.inner.controller.borrow())
    }
}

impl<P: Page> AppInner<P> {
    fn dispatch(&self, event: SyncEvent) {
        log_debug!("[Checklist] {event:?}");
        match event {
            SyncEvent::StatusSelected { index, status } => {
                let Ok(mut model) = self.model.try_borrow_mut() else {
                    log_debug!("[Checklist] Model busy, ignoring selection of item {index}");
                    return;
                };
                // the model's change callback recomputes the native value
                model.set_status(index, status);
            }
            SyncEvent::DomChanged => {
                self.with_model_and_controller(|model, controller| controller.observe(model).map(drop));
            }
            SyncEvent::ProxyEdited => {
                self.with_model_and_controller(|model, controller| controller.on_proxy_edited(model));
            }
            SyncEvent::ProxyKey(chord) => {
                self.with_controller(|controller| controller.on_proxy_key(&chord).map(drop));
            }
            SyncEvent::NativeFocused { binding } => {
                self.with_controller(|controller| controller.on_native_focused(binding));
            }
        }
    }

    /// Run `f` unless the controller is already handling an event further up the
    /// stack (e.g. the focus listener firing while a key is forwarded).
    fn with_controller(&self, f: impl FnOnce(&mut SyncController<P>) -> Result<(), HostError>) {
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            log_debug!("[Checklist] Controller busy, ignoring re-entrant event");
            return;
        };
        if let Err(error) = f(&mut controller) {
            log_error!("[Checklist Sync] {error}");
        }
    }

    fn with_model_and_controller(
        &self,
        f: impl FnOnce(&ChecklistModel, &mut SyncController<P>) -> Result<(), HostError>,
    ) {
        let Ok(model) = self.model.try_borrow() else {
            log_debug!("[Checklist] Model busy, ignoring re-entrant event");
            return;
        };
        self.with_controller(|controller| f(&model, controller));
    }
}

/// A second start was attempted on the same page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyStarted;

impl fmt::Display for AlreadyStarted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Only a single Gerrit checklist is allowed.")
    }
}

impl std::error::Error for AlreadyStarted {}

enum SlotState<T> {
    Empty,
    Starting,
    Running(T),
}

/// Holds the single application instance of a page.
///
/// The entry point reserves the slot before the config fetch starts and installs the
/// app once it is built; any later reservation fails.
pub struct AppSlot<T> {
    state: SlotState<T>,
}

impl<T> Default for AppSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AppSlot<T> {
    pub const fn new() -> Self {
        Self {
            state: SlotState::Empty,
        }
    }

    pub fn reserve(&mut self) -> Result<(), AlreadyStarted> {
        match self.state {
            SlotState::Empty => {
                self.state = SlotState::Starting;
                Ok(())
            }
            SlotState::Starting | SlotState::Running(_) => Err(AlreadyStarted),
        }
    }

    pub fn install(&mut self, app: T) {
        self.state = SlotState::Running(app);
    }

    pub fn is_reserved(&self) -> bool {
        !matches!(self.state, SlotState::Empty)
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            SlotState::Running(app) => Some(app),
            SlotState::Empty | SlotState::Starting => None,
        }
    }
}
