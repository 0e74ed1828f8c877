use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Page};
use crate::dispatch::UiEvent;

/// Rows moved by PgUp/PgDn.
const PAGE_STEP: usize = 10;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    // Modal closes through the signal queue like the other mode changes
    if app.modal.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.signals().send(UiEvent::ModalClose);
        }
        return;
    }

    if app.show_help {
        app.show_help = false;
        return;
    }

    // A focused search bar owns the keyboard on every page
    if app.search.is_focused() {
        handle_search_input(app, key);
        return;
    }

    match app.page {
        Page::Main => handle_main_key(app, key),
        Page::Topic => handle_topic_key(app, key),
    }
}

fn handle_navigation(app: &mut App, key: KeyEvent) -> bool {
    let table = app.active_table_mut();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => table.select_prev(1),
        KeyCode::Down | KeyCode::Char('j') => table.select_next(1),
        KeyCode::PageUp => table.select_prev(PAGE_STEP),
        KeyCode::PageDown => table.select_next(PAGE_STEP),
        KeyCode::Home | KeyCode::Char('g') => table.scroll_to_top(),
        KeyCode::End | KeyCode::Char('G') => table.scroll_to_end(),
        _ => return false,
    }
    true
}

fn handle_main_key(app: &mut App, key: KeyEvent) {
    if handle_navigation(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char(':') => app.signals().send(UiEvent::FocusSearch),
        KeyCode::Char('/') => app.signals().send(UiEvent::StartTableSearch),
        KeyCode::Enter => app.drill_down(),
        KeyCode::Char('c') => app.copy_selection(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Esc => app.go_back(),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.search.blur(),
        KeyCode::Enter => {
            app.submit_search();
        }
        KeyCode::Tab => {
            app.search.accept_suggestion();
        }
        KeyCode::Backspace => app.search.pop_char(),
        KeyCode::Char(c) => app.search.push_char(c),
        _ => {}
    }
}

fn handle_topic_key(app: &mut App, key: KeyEvent) {
    let (detail_open, search_open) = match app.topic.as_ref() {
        Some(page) => (page.detail.is_some(), page.search.is_some()),
        None => (false, false),
    };

    if detail_open {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace) {
            app.close_detail();
        }
        return;
    }

    if search_open {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => app.close_topic_search(),
            KeyCode::Backspace => app.edit_topic_search(|text| {
                text.pop();
            }),
            KeyCode::Char(c) => app.edit_topic_search(|text| text.push(c)),
            _ => {}
        }
        return;
    }

    if handle_navigation(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char('/') => app.open_topic_search(),
        KeyCode::Char(':') => app.signals().send(UiEvent::FocusSearch),
        KeyCode::Char('o') => app.toggle_offset_policy(),
        KeyCode::Char('c') => app.copy_selection(),
        KeyCode::Enter => app.drill_down(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Esc => app.go_back(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use kafkalens_adapters::MemoryGateway;
    use kafkalens_types::TopicMeta;

    use crate::app::AppOptions;
    use crate::clipboard::MemoryClipboard;
    use crate::dispatch::{SignalSender, SignalTarget, UiQueue};
    use crate::resource::ResourceKind;
    use crate::search::SearchMode;
    use crate::supervisor::Recovery;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn test_app() -> (App, tokio::sync::mpsc::UnboundedReceiver<UiEvent>) {
        let gateway = MemoryGateway::new("local");
        gateway.add_topic("orders", TopicMeta::new(3, 1, 0));
        let (ui, _rx) = UiQueue::channel();
        let (signals, signal_rx) = SignalSender::channel();
        let app = App::new(
            AppOptions::new(Arc::new(gateway), Recovery::new()),
            ui,
            signals,
            Box::new(MemoryClipboard::default()),
        );
        (app, signal_rx)
    }

    #[tokio::test]
    async fn test_colon_sends_focus_search() {
        let (mut app, mut signals) = test_app();
        press(&mut app, KeyCode::Char(':'));
        assert_eq!(signals.try_recv().unwrap(), UiEvent::FocusSearch);
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(signals.try_recv().unwrap(), UiEvent::StartTableSearch);
    }

    #[tokio::test]
    async fn test_search_input_submits_exit() {
        let (mut app, _signals) = test_app();
        app.search.focus_resource_search();
        type_text(&mut app, "exit");
        assert_eq!(app.search.input(), "exit");
        press(&mut app, KeyCode::Enter);
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_search_tab_accepts_suggestion() {
        let (mut app, _signals) = test_app();
        app.search.focus_resource_search();
        type_text(&mut app, "co");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.search.input(), "context");
        assert_eq!(app.search.mode(), SearchMode::ResourceSearch);
    }

    #[tokio::test]
    async fn test_modal_close_goes_through_signal() {
        let (mut app, mut signals) = test_app();
        app.modal = Some("Resource \"nope\" not found".into());
        press(&mut app, KeyCode::Char('x'));
        assert!(signals.try_recv().is_err());
        press(&mut app, KeyCode::Esc);
        assert_eq!(signals.try_recv().unwrap(), UiEvent::ModalClose);
    }

    #[tokio::test]
    async fn test_resource_search_from_topic_page() {
        let (mut app, mut signals) = test_app();
        app.open_topic("orders");
        assert_eq!(signals.try_recv().unwrap(), UiEvent::PageChange);
        let flags = app.topic.as_ref().unwrap().stream.flags();

        press(&mut app, KeyCode::Char(':'));
        let event = signals.try_recv().unwrap();
        assert_eq!(event, UiEvent::FocusSearch);
        app.apply_signal(event);

        // letters that are topic-page commands must land in the search bar
        type_text(&mut app, "groups");
        assert_eq!(app.search.input(), "groups");
        assert_eq!(app.topic.as_ref().unwrap().stream.flags(), flags);
        assert_eq!(app.page, Page::Topic);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.resource.kind(), ResourceKind::ConsumerGroups);
        assert_eq!(app.page, Page::Main);
        assert!(app.topic.is_none());
        assert!(!app.search.is_focused());
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let (mut app, _signals) = test_app();
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_topic_page_inline_filter() {
        let (mut app, _signals) = test_app();
        app.open_topic("orders");
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "paid");
        assert_eq!(app.topic.as_ref().unwrap().stream.filter(), "paid");
        press(&mut app, KeyCode::Enter);
        assert!(app.topic.as_ref().unwrap().search.is_none());
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.page, Page::Main);
    }
}
