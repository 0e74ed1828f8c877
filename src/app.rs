//! Application state and navigation logic.
//!
//! [`App`] is owned by the UI thread. Background tasks reach it only through
//! the [`UiQueue`] (closures run between frames) and the signal dispatcher.

use std::sync::Arc;
use std::time::Duration;

use kafkalens_adapters::Gateway;
use kafkalens_types::{ConsumeFlags, ConsumedMessage};
use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::dispatch::{SignalSender, SignalTarget, UiEvent, UiQueue};
use crate::resource::{Resource, ResourceHooks, ResourceKind};
use crate::search::{SearchCoordinator, SearchHost, SubmitOutcome};
use crate::stream::{StreamHooks, TopicStream};
use crate::supervisor::{spawn_supervised, Recovery};
use crate::ui::Theme;
use crate::view::render::render_messages;
use crate::view::status::DEFAULT_NOTIFICATION;
use crate::view::{MessageRows, StatusLine, TableModel};

pub const COPY_SUCCESS: &str = "😎 Copied selection to clipboard ...";

/// Which page fills the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// The active resource's table.
    Main,
    /// Live messages of one topic.
    Topic,
}

/// Everything the app needs from bootstrap.
#[derive(Clone)]
pub struct AppOptions {
    pub gateway: Arc<dyn Gateway>,
    pub poll_interval: Duration,
    pub refresh_interval: Duration,
    pub default_flags: ConsumeFlags,
    pub theme: Theme,
    pub recovery: Recovery,
}

impl AppOptions {
    pub fn new(gateway: Arc<dyn Gateway>, recovery: Recovery) -> Self {
        Self {
            gateway,
            poll_interval: crate::resource::DEFAULT_POLL_INTERVAL,
            refresh_interval: crate::stream::DEFAULT_REFRESH_INTERVAL,
            default_flags: ConsumeFlags::default(),
            theme: Theme::dark(),
            recovery,
        }
    }
}

/// State of an open topic page.
#[derive(Debug)]
pub struct TopicPage {
    pub stream: TopicStream,
    pub table: TableModel,
    /// Inline filter input, when open.
    pub search: Option<String>,
    /// Message shown in the detail overlay.
    pub detail: Option<ConsumedMessage>,
    /// Cached messages before filtering, as of the last repaint.
    pub total: usize,
}

impl TopicPage {
    fn title(&self, shown: usize) -> String {
        format!("<{} ({})>", self.stream.topic(), shown)
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub page: Page,
    pub show_help: bool,
    /// Text of the visible modal, if any.
    pub modal: Option<String>,

    pub resource: Resource,
    pub search: SearchCoordinator,
    pub main_table: TableModel,
    /// Filter applied to the main table.
    pub filter: String,
    pub topic: Option<TopicPage>,

    pub status: StatusLine,
    pub theme: Theme,
    pub poll_interval: Duration,

    signals: SignalSender,
    ui: UiQueue<App>,
    clipboard: Box<dyn Clipboard>,
    gateway: Arc<dyn Gateway>,
    stream_hooks: StreamHooks,
    default_flags: ConsumeFlags,
    recovery: Recovery,
}

/// Split borrow of the main view handed to the search coordinator.
struct MainViewHost<'a> {
    table: &'a mut TableModel,
    filter: &'a mut String,
    modal: &'a mut Option<String>,
    running: &'a mut bool,
}

impl SearchHost for MainViewHost<'_> {
    fn update_view(&mut self, resource: &Resource, filter: &str) {
        *self.filter = filter.to_string();
        resource.render(self.table, filter);
    }

    fn resource_not_found(&mut self, text: &str) {
        *self.modal = Some(format!("Resource \"{}\" not found", text));
    }

    fn exit(&mut self) {
        *self.running = false;
    }
}

impl App {
    /// Create the app showing topics. Polling starts immediately.
    pub fn new(
        options: AppOptions,
        ui: UiQueue<App>,
        signals: SignalSender,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let refresh_queue = ui.clone();
        let error_queue = ui.clone();
        let resource_hooks = ResourceHooks::new(options.gateway.clone(), options.recovery.clone())
            .with_interval(options.poll_interval)
            .on_refresh(move |kind| {
                refresh_queue.post(move |app: &mut App| app.refresh_main_view(kind));
            })
            .on_error(move |kind, error| {
                error_queue.post(move |app: &mut App| {
                    app.notify(format!("{} refresh failed: {}", kind, error));
                });
            });

        let rows_queue = ui.clone();
        let stream_hooks = StreamHooks::new(options.gateway.clone(), options.recovery.clone())
            .with_refresh_interval(options.refresh_interval)
            .on_rows(move |rows| {
                rows_queue.post(move |app: &mut App| app.apply_message_rows(rows));
            });

        let mut resource = Resource::new(ResourceKind::Topics, resource_hooks.clone());
        resource.start_polling();
        let mut main_table = TableModel::new();
        resource.render(&mut main_table, "");

        Self {
            running: true,
            page: Page::Main,
            show_help: false,
            modal: None,
            resource,
            search: SearchCoordinator::new(resource_hooks),
            main_table,
            filter: String::new(),
            topic: None,
            status: StatusLine::new(),
            theme: options.theme,
            poll_interval: options.poll_interval,
            signals,
            ui,
            clipboard,
            gateway: options.gateway,
            stream_hooks,
            default_flags: options.default_flags,
            recovery: options.recovery,
        }
    }

    pub fn signals(&self) -> &SignalSender {
        &self.signals
    }

    pub fn current_context(&self) -> String {
        self.gateway.current_context()
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.status.notify(text, DEFAULT_NOTIFICATION);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// The table under the cursor on the current page.
    pub fn active_table(&self) -> &TableModel {
        match (&self.page, &self.topic) {
            (Page::Topic, Some(topic)) => &topic.table,
            _ => &self.main_table,
        }
    }

    pub fn active_table_mut(&mut self) -> &mut TableModel {
        match (&self.page, &mut self.topic) {
            (Page::Topic, Some(topic)) => &mut topic.table,
            _ => &mut self.main_table,
        }
    }

    /// Repaint the main table if `kind` is still the active resource.
    pub fn refresh_main_view(&mut self, kind: ResourceKind) {
        if self.resource.kind() == kind {
            self.resource.render(&mut self.main_table, &self.filter);
        }
    }

    /// Submit the search input.
    pub fn submit_search(&mut self) -> SubmitOutcome {
        let App {
            search,
            resource,
            main_table,
            filter,
            modal,
            running,
            ..
        } = self;
        let mut host = MainViewHost {
            table: main_table,
            filter,
            modal,
            running,
        };
        let outcome = search.submit(resource, &mut host);
        if let SubmitOutcome::Switched(_) = outcome {
            if self.page == Page::Topic {
                self.close_topic_page();
            }
            self.main_table.scroll_to_top();
        }
        outcome
    }

    /// Copy the selected row of the active table.
    pub fn copy_selection(&mut self) {
        let text = match self.active_table().selection_csv() {
            Ok(text) => text,
            Err(invalid) => {
                self.notify(invalid.to_string());
                return;
            }
        };
        match self.clipboard.set_text(&text) {
            Ok(()) => self.notify(COPY_SUCCESS),
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                self.notify(format!("Copy failed: {}", e));
            }
        }
    }

    /// Act on Enter over the selected row of the active table.
    pub fn drill_down(&mut self) {
        if self.page == Page::Topic {
            self.open_detail();
            return;
        }
        let Some(name) = self.main_table.selected_cells().and_then(|c| c.first()).cloned() else {
            return;
        };
        match self.resource.kind() {
            ResourceKind::Topics => self.open_topic(&name),
            ResourceKind::Contexts => self.switch_context(&name),
            ResourceKind::ConsumerGroups => {}
        }
    }

    /// Open the topic page and start streaming `topic`.
    pub fn open_topic(&mut self, topic: &str) {
        info!(%topic, "opening topic page");
        let mut stream = TopicStream::new(topic, self.default_flags, self.stream_hooks.clone());
        stream.consume();
        let mut page = TopicPage {
            stream,
            table: TableModel::new(),
            search: None,
            detail: None,
            total: 0,
        };
        let title = page.title(0);
        render_messages(&mut page.table, title, Vec::new());
        self.topic = Some(page);
        self.page = Page::Topic;
        self.signals.send(UiEvent::PageChange);
    }

    /// Leave the topic page, stopping its pipeline in the background.
    pub fn close_topic_page(&mut self) {
        if let Some(mut page) = self.topic.take() {
            info!(topic = page.stream.topic(), "closing topic page");
            drop(page.stream.close());
        }
        self.page = Page::Main;
        self.signals.send(UiEvent::PageChange);
    }

    /// Paint rows built by the refresh task, ignoring stale sessions.
    pub fn apply_message_rows(&mut self, rows: MessageRows) {
        let Some(page) = self.topic.as_mut() else {
            return;
        };
        if rows.session != page.stream.session() {
            return;
        }
        let title = page.title(rows.rows.len());
        page.total = rows.total;
        render_messages(&mut page.table, title, rows.rows);
    }

    /// Flip the topic page between earliest and latest.
    pub fn toggle_offset_policy(&mut self) {
        let Some(page) = self.topic.as_mut() else {
            return;
        };
        page.stream.toggle_offset_policy();
        page.search = None;
        page.detail = None;
        let flags = page.stream.flags();
        self.notify(format!(
            "Consuming from {} (tail {})",
            flags.offset_policy, flags.tail
        ));
    }

    pub fn open_topic_search(&mut self) {
        if let Some(page) = self.topic.as_mut() {
            page.search = Some(page.stream.filter());
        }
    }

    pub fn close_topic_search(&mut self) {
        if let Some(page) = self.topic.as_mut() {
            page.search = None;
        }
    }

    /// Edit the inline filter; every change applies immediately.
    pub fn edit_topic_search(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(page) = self.topic.as_mut() else {
            return;
        };
        let Some(text) = page.search.as_mut() else {
            return;
        };
        edit(text);
        let filter = text.clone();
        page.stream.set_filter(filter);
    }

    fn open_detail(&mut self) {
        let Some(page) = self.topic.as_mut() else {
            return;
        };
        let position = page.table.selected_cells().and_then(|cells| {
            let offset = cells.first()?.parse::<i64>().ok()?;
            let partition = cells.get(1)?.parse::<i32>().ok()?;
            Some((partition, offset))
        });
        if let Some((partition, offset)) = position {
            page.detail = page.stream.message(partition, offset);
        }
    }

    pub fn close_detail(&mut self) {
        if let Some(page) = self.topic.as_mut() {
            page.detail = None;
        }
    }

    /// Point the gateway at another context and restart the active poller.
    pub fn switch_context(&mut self, name: &str) {
        if name == self.gateway.current_context() {
            return;
        }
        let gateway = self.gateway.clone();
        let ui = self.ui.clone();
        let name = name.to_string();
        spawn_supervised("context-switch", self.recovery.clone(), async move {
            let result = gateway.set_context(&name).await;
            ui.post(move |app: &mut App| match result {
                Ok(()) => {
                    info!(context = %name, "switched context");
                    app.notify(format!("Switched to context {}", name));
                    app.resource.start_polling();
                }
                Err(e) => {
                    warn!(context = %name, error = %e, "context switch failed");
                    app.notify(format!("Switching to {} failed: {}", name, e));
                }
            });
        });
    }

    /// Esc outside of any input.
    pub fn go_back(&mut self) {
        match self.page {
            Page::Topic => {
                if self.topic.as_ref().is_some_and(|p| p.detail.is_some()) {
                    self.close_detail();
                } else {
                    self.close_topic_page();
                }
            }
            Page::Main => {
                if !self.filter.is_empty() {
                    self.filter.clear();
                    self.resource.render(&mut self.main_table, "");
                }
            }
        }
    }

    /// Stop every background task owned by the app.
    pub fn shutdown(&mut self) {
        self.resource.stop_polling();
        if let Some(mut page) = self.topic.take() {
            drop(page.stream.close());
        }
    }
}

impl SignalTarget for App {
    fn apply_signal(&mut self, event: UiEvent) {
        match event {
            UiEvent::ModalClose => self.close_modal(),
            UiEvent::FocusSearch => self.search.focus_resource_search(),
            UiEvent::StartTableSearch => self.search.start_table_search(),
            UiEvent::PageChange => {
                self.search.blur();
                if self.page == Page::Main {
                    self.resource.render(&mut self.main_table, &self.filter);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::dispatch::UiQueueReceiver;
    use kafkalens_adapters::MemoryGateway;
    use kafkalens_types::TopicMeta;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn app_with(gateway: MemoryGateway) -> (App, UiQueueReceiver<App>, UnboundedReceiver<UiEvent>) {
        let (ui, rx) = UiQueue::channel();
        let (signals, signal_rx) = SignalSender::channel();
        let options = AppOptions::new(Arc::new(gateway), Recovery::new());
        let app = App::new(options, ui, signals, Box::new(MemoryClipboard::default()));
        (app, rx, signal_rx)
    }

    #[tokio::test]
    async fn test_copy_header_only_is_invalid() {
        let (mut app, _rx, _signals) = app_with(MemoryGateway::new("local"));
        app.main_table.clear();
        app.main_table.set_header_row(&["Topic"]);
        app.main_table.select_row(0);

        app.copy_selection();
        assert_eq!(app.status.last(), Some("Copy: Invalid row selection"));
    }

    #[tokio::test]
    async fn test_copy_selected_row() {
        let gateway = MemoryGateway::new("local");
        gateway.add_topic("orders", TopicMeta::new(3, 1, 7));
        let (mut app, _rx, _signals) = app_with(gateway);

        app.main_table.clear();
        app.main_table.set_header_row(&["Topic", "Partitions"]);
        app.main_table.push_row(vec!["orders".into(), "3".into()]);
        app.main_table.select_row(1);

        app.copy_selection();
        assert_eq!(app.status.last(), Some(COPY_SUCCESS));
    }

    #[tokio::test]
    async fn test_signals_change_search_mode() {
        let (mut app, _rx, _signals) = app_with(MemoryGateway::new("local"));
        app.apply_signal(UiEvent::StartTableSearch);
        assert!(app.search.is_focused());
        assert_eq!(app.search.label(), "/");

        app.modal = Some("oops".into());
        app.apply_signal(UiEvent::ModalClose);
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn test_stale_rows_are_ignored() {
        let gateway = MemoryGateway::new("local");
        gateway.add_topic("orders", TopicMeta::new(1, 1, 0));
        let (mut app, _rx, _signals) = app_with(gateway);
        app.open_topic("orders");
        let session = app.topic.as_ref().unwrap().stream.session();

        app.apply_message_rows(MessageRows {
            session: session + 1,
            rows: vec![vec!["1".into(); 6]],
            total: 1,
        });
        assert_eq!(app.active_table().data_row_count(), 0);

        app.apply_message_rows(MessageRows {
            session,
            rows: vec![vec!["1".into(); 6]],
            total: 1,
        });
        assert_eq!(app.active_table().data_row_count(), 1);
        assert_eq!(app.active_table().title(), "<orders (1)>");

        app.go_back();
        assert_eq!(app.page, Page::Main);
        assert!(app.topic.is_none());
    }
}
