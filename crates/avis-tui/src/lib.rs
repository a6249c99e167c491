// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use avis_app::{
    AppCommand, AppEvent, AppState, ClientGateway, ClientId, Mode, Outcome, SentimentGateway,
    SentimentId, TabKind,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    selected_row: usize,
    form_field: usize,
    edit_field: usize,
    status_token: u64,
}

/// Drives the terminal console until the user quits.
pub fn run_app<G>(state: &mut AppState, gateway: &mut G) -> Result<()>
where
    G: ClientGateway + SentimentGateway,
{
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = reload_all(state, gateway) {
        state.set_status(&format!("load failed: {error}"));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, gateway, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: &str,
) {
    state.set_status(message);
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn reload_all<G>(state: &mut AppState, gateway: &mut G) -> Result<()>
where
    G: ClientGateway + SentimentGateway,
{
    state.refresh_clients(gateway)?;
    state.refresh_sentiments(gateway)
}

fn handle_key_event<G>(
    state: &mut AppState,
    gateway: &mut G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool
where
    G: ClientGateway + SentimentGateway,
{
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.client_edit.is_some() || state.sentiment_edit.is_some() {
        handle_edit_overlay_key(state, gateway, view_data, internal_tx, key);
        return false;
    }

    if state.mode == Mode::Form {
        handle_form_key(state, gateway, view_data, internal_tx, key);
        return false;
    }

    handle_nav_key(state, gateway, view_data, internal_tx, key)
}

fn handle_nav_key<G>(
    state: &mut AppState,
    gateway: &mut G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool
where
    G: ClientGateway + SentimentGateway,
{
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('f') | KeyCode::Tab, KeyModifiers::NONE) => {
            dispatch_and_refresh(state, gateway, view_data, internal_tx, AppCommand::NextTab);
        }
        (KeyCode::Char('b'), KeyModifiers::NONE) | (KeyCode::BackTab, _) => {
            dispatch_and_refresh(state, gateway, view_data, internal_tx, AppCommand::PrevTab);
        }
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            move_selection(state, view_data, 1);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            move_selection(state, view_data, -1);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            view_data.selected_row = 0;
        }
        (KeyCode::Char('G'), _) => {
            view_data.selected_row = active_row_count(state).saturating_sub(1);
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            view_data.form_field = 0;
            state.dispatch(AppCommand::OpenForm);
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            begin_selected_edit(state, view_data);
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            delete_selected(state, gateway, view_data, internal_tx);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            match reload_all(state, gateway) {
                Ok(()) => emit_status(state, view_data, internal_tx, "reloaded"),
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        &format!("load failed: {error}"),
                    );
                }
            }
            clamp_selection(state, view_data);
        }
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::ClearStatus);
        }
        _ => {}
    }
    false
}

fn handle_form_key<G>(
    state: &mut AppState,
    gateway: &mut G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) where
    G: ClientGateway + SentimentGateway,
{
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::CloseForm);
        }
        (KeyCode::Enter, _) => {
            submit_form(state, gateway, view_data, internal_tx);
        }
        (KeyCode::Tab, KeyModifiers::NONE) => {
            view_data.form_field = (view_data.form_field + 1) % form_field_count(state);
        }
        (KeyCode::BackTab, _) => {
            let count = form_field_count(state);
            view_data.form_field = (view_data.form_field + count - 1) % count;
        }
        _ => edit_form_field(state, view_data, key),
    }
}

fn submit_form<G>(
    state: &mut AppState,
    gateway: &mut G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) where
    G: ClientGateway + SentimentGateway,
{
    let result = match state.active_tab {
        TabKind::Clients => state
            .add_client(gateway)
            .map(|outcome| (outcome, "client added")),
        TabKind::Sentiments => state
            .add_sentiment(gateway)
            .map(|outcome| (outcome, "sentiment added")),
    };
    match result {
        Ok((Outcome::Done, message)) => {
            state.dispatch(AppCommand::CloseForm);
            view_data.form_field = 0;
            emit_status(state, view_data, internal_tx, message);
            clamp_selection(state, view_data);
        }
        Ok((Outcome::Skipped, _)) => {}
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                &format!("add failed: {error}"),
            );
        }
    }
}

fn edit_form_field(state: &mut AppState, view_data: &ViewData, key: KeyEvent) {
    match state.active_tab {
        TabKind::Clients => edit_text_field(&mut state.new_email, key),
        TabKind::Sentiments => match view_data.form_field {
            0 => edit_text_field(&mut state.new_text, key),
            1 => {
                if polarity_toggle_key(key) {
                    state.new_polarity = state.new_polarity.toggled();
                }
            }
            _ => cycle_client_choice(state, key),
        },
    }
}

fn handle_edit_overlay_key<G>(
    state: &mut AppState,
    gateway: &mut G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) where
    G: ClientGateway + SentimentGateway,
{
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            if state.client_edit.is_some() {
                state.cancel_edit_client();
            } else {
                state.cancel_edit_sentiment();
            }
            emit_status(state, view_data, internal_tx, "edit canceled");
        }
        (KeyCode::Enter, _) => {
            submit_edit(state, gateway, view_data, internal_tx);
        }
        (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::BackTab, _) => {
            if state.sentiment_edit.is_some() {
                view_data.edit_field = (view_data.edit_field + 1) % 2;
            }
        }
        _ => edit_overlay_field(state, view_data, key),
    }
}

fn submit_edit<G>(
    state: &mut AppState,
    gateway: &mut G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) where
    G: ClientGateway + SentimentGateway,
{
    let result = if state.client_edit.is_some() {
        state
            .save_client(gateway)
            .map(|outcome| (outcome, "client saved"))
    } else {
        state
            .save_sentiment(gateway)
            .map(|outcome| (outcome, "sentiment saved"))
    };
    match result {
        Ok((Outcome::Done, message)) => {
            emit_status(state, view_data, internal_tx, message);
            clamp_selection(state, view_data);
        }
        Ok((Outcome::Skipped, _)) => {}
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                &format!("save failed: {error}"),
            );
        }
    }
}

fn edit_overlay_field(state: &mut AppState, view_data: &ViewData, key: KeyEvent) {
    if let Some(edit) = &mut state.client_edit {
        edit_text_field(&mut edit.email, key);
        return;
    }
    let Some(edit) = &mut state.sentiment_edit else {
        return;
    };
    match view_data.edit_field {
        0 => edit_text_field(&mut edit.text, key),
        _ => {
            if polarity_toggle_key(key) {
                edit.polarity = edit.polarity.toggled();
            }
        }
    }
}

fn edit_text_field(value: &mut String, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => value.push(c),
        KeyCode::Backspace => {
            value.pop();
        }
        _ => {}
    }
}

fn polarity_toggle_key(key: KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
    )
}

fn cycle_client_choice(state: &mut AppState, key: KeyEvent) {
    let delta: isize = match key.code {
        KeyCode::Left => -1,
        KeyCode::Right | KeyCode::Char(' ') => 1,
        _ => return,
    };
    state.new_client_id = next_client_choice(state, state.new_client_id, delta);
}

fn next_client_choice(
    state: &AppState,
    current: Option<ClientId>,
    delta: isize,
) -> Option<ClientId> {
    if state.clients.is_empty() {
        return None;
    }
    let len = state.clients.len() as isize;
    let position = current.and_then(|id| state.clients.iter().position(|client| client.id == id));
    let next_index = match position {
        Some(index) => (index as isize + delta).rem_euclid(len),
        None if delta >= 0 => 0,
        None => len - 1,
    };
    state
        .clients
        .get(next_index as usize)
        .map(|client| client.id)
}

fn dispatch_and_refresh<G>(
    state: &mut AppState,
    gateway: &mut G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) where
    G: ClientGateway + SentimentGateway,
{
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::TabChanged(_)))
    {
        view_data.selected_row = 0;
        if let Err(error) = reload_all(state, gateway) {
            emit_status(
                state,
                view_data,
                internal_tx,
                &format!("load failed: {error}"),
            );
        }
    }
}

fn begin_selected_edit(state: &mut AppState, view_data: &mut ViewData) {
    match state.active_tab {
        TabKind::Clients => {
            if let Some(id) = selected_client_id(state, view_data) {
                state.begin_edit_client(id);
            }
        }
        TabKind::Sentiments => {
            if let Some(id) = selected_sentiment_id(state, view_data) {
                state.begin_edit_sentiment(id);
            }
        }
    }
    view_data.edit_field = 0;
}

fn delete_selected<G>(
    state: &mut AppState,
    gateway: &mut G,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) where
    G: ClientGateway + SentimentGateway,
{
    let outcome = match state.active_tab {
        TabKind::Clients => {
            let Some(id) = selected_client_id(state, view_data) else {
                return;
            };
            state.remove_client(gateway, id).map(|()| "client deleted")
        }
        TabKind::Sentiments => {
            let Some(id) = selected_sentiment_id(state, view_data) else {
                return;
            };
            state
                .remove_sentiment(gateway, id)
                .map(|()| "sentiment deleted")
        }
    };
    match outcome {
        Ok(message) => emit_status(state, view_data, internal_tx, message),
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                &format!("delete failed: {error}"),
            );
        }
    }
    clamp_selection(state, view_data);
}

fn selected_client_id(state: &AppState, view_data: &ViewData) -> Option<ClientId> {
    state
        .clients
        .get(view_data.selected_row)
        .map(|client| client.id)
}

fn selected_sentiment_id(state: &AppState, view_data: &ViewData) -> Option<SentimentId> {
    state
        .sentiments
        .get(view_data.selected_row)
        .map(|sentiment| sentiment.id)
}

fn active_row_count(state: &AppState) -> usize {
    match state.active_tab {
        TabKind::Clients => state.clients.len(),
        TabKind::Sentiments => state.sentiments.len(),
    }
}

fn move_selection(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let rows = active_row_count(state);
    if rows == 0 {
        return;
    }
    let next = (view_data.selected_row as isize + delta).clamp(0, rows as isize - 1);
    view_data.selected_row = next as usize;
}

fn clamp_selection(state: &AppState, view_data: &mut ViewData) {
    let rows = active_row_count(state);
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
}

fn form_field_count(state: &AppState) -> usize {
    match state.active_tab {
        TabKind::Clients => 1,
        TabKind::Sentiments => 3,
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, state))
        .collect::<Vec<String>>();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("avis").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_tab {
        TabKind::Clients => render_clients_table(frame, layout[1], state, view_data),
        TabKind::Sentiments => render_sentiments_table(frame, layout[1], state, view_data),
    }

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if state.mode == Mode::Form {
        let area = centered_rect(56, 40, frame.area());
        frame.render_widget(Clear, area);
        let form = Paragraph::new(render_form_overlay_text(state, view_data)).block(
            Block::default()
                .title(form_overlay_title(state))
                .borders(Borders::ALL),
        );
        frame.render_widget(form, area);
    }

    if state.client_edit.is_some() || state.sentiment_edit.is_some() {
        let area = centered_rect(56, 36, frame.area());
        frame.render_widget(Clear, area);
        let edit = Paragraph::new(render_edit_overlay_text(state, view_data)).block(
            Block::default()
                .title(edit_overlay_title(state))
                .borders(Borders::ALL),
        );
        frame.render_widget(edit, area);
    }
}

fn tab_title(tab: TabKind, state: &AppState) -> String {
    let count = match tab {
        TabKind::Clients => state.clients.len(),
        TabKind::Sentiments => state.sentiments.len(),
    };
    format!(" {} ({count}) ", tab.label())
}

fn render_clients_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let header = Row::new([Cell::from("id"), Cell::from("email")]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows = state.clients.iter().enumerate().map(|(row_index, client)| {
        let style = if row_index == view_data.selected_row {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new([
            Cell::from(client.id.get().to_string()),
            Cell::from(client.email.clone()),
        ])
        .style(style)
    });

    let widths = [Constraint::Length(6), Constraint::Min(24)];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(" clients ").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_sentiments_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let header = Row::new([
        Cell::from("id"),
        Cell::from("type"),
        Cell::from("text"),
        Cell::from("client"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows = state.sentiments.iter().enumerate().map(|(row_index, sentiment)| {
        let style = if row_index == view_data.selected_row {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new([
            Cell::from(sentiment.id.get().to_string()),
            Cell::from(sentiment.polarity.as_str()),
            Cell::from(sentiment.text.clone()),
            Cell::from(state.resolve_client_email(sentiment).to_owned()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Min(28),
        Constraint::Min(20),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(sentiments_title(state))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn sentiments_title(state: &AppState) -> String {
    format!(
        " sentiments ({} positive / {} negative) ",
        state.positive_count(),
        state.negative_count(),
    )
}

fn status_text(state: &AppState) -> String {
    let editing = state.client_edit.is_some() || state.sentiment_edit.is_some();
    let (mode, hints) = if editing {
        ("EDIT", "tab field | enter save | esc cancel")
    } else {
        match state.mode {
            Mode::Nav => (
                "NAV",
                "j/k move | f/b tabs | a add | e edit | d delete | r reload | ctrl+q quit",
            ),
            Mode::Form => ("FORM", "tab field | enter submit | esc close"),
        }
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn form_overlay_title(state: &AppState) -> &'static str {
    match state.active_tab {
        TabKind::Clients => " new client ",
        TabKind::Sentiments => " new sentiment ",
    }
}

fn render_form_overlay_text(state: &AppState, view_data: &ViewData) -> String {
    match state.active_tab {
        TabKind::Clients => format!(
            "{} email: {}",
            field_marker(view_data.form_field == 0),
            state.new_email,
        ),
        TabKind::Sentiments => {
            let client_label = state
                .new_client_id
                .and_then(|id| state.clients.iter().find(|client| client.id == id))
                .map_or("none", |client| client.email.as_str());
            [
                format!(
                    "{} text: {}",
                    field_marker(view_data.form_field == 0),
                    state.new_text,
                ),
                format!(
                    "{} type: {}",
                    field_marker(view_data.form_field == 1),
                    state.new_polarity.as_str(),
                ),
                format!(
                    "{} client: {client_label}",
                    field_marker(view_data.form_field == 2),
                ),
            ]
            .join("\n")
        }
    }
}

fn edit_overlay_title(state: &AppState) -> String {
    if let Some(edit) = &state.client_edit {
        format!(" edit client {} ", edit.id.get())
    } else if let Some(edit) = &state.sentiment_edit {
        format!(" edit sentiment {} ", edit.id.get())
    } else {
        String::new()
    }
}

fn render_edit_overlay_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(edit) = &state.client_edit {
        return format!("> email: {}", edit.email);
    }
    let Some(edit) = &state.sentiment_edit else {
        return String::new();
    };
    [
        format!(
            "{} text: {}",
            field_marker(view_data.edit_field == 0),
            edit.text,
        ),
        format!(
            "{} type: {}",
            field_marker(view_data.edit_field == 1),
            edit.polarity.as_str(),
        ),
    ]
    .join("\n")
}

const fn field_marker(active: bool) -> &'static str {
    if active { ">" } else { " " }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
