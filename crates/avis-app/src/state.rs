// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::validation::normalized_required;
use crate::{Client, ClientId, Mode, Polarity, Sentiment, SentimentId, TabKind};

/// Label rendered when a sentiment's owning client cannot be resolved from
/// the local collection.
pub const UNKNOWN_CLIENT: &str = "—";

/// Remote CRUD surface for client records. Implementations translate these
/// calls into requests against the data service and retain no record state.
pub trait ClientGateway {
    fn list(&mut self) -> Result<Vec<Client>>;
    fn create(&mut self, email: &str) -> Result<Client>;
    fn update(&mut self, id: ClientId, email: &str) -> Result<Client>;
    fn remove(&mut self, id: ClientId) -> Result<()>;
}

/// Remote CRUD surface for sentiment records. `create` carries the owning
/// client reference; `update` never touches it.
pub trait SentimentGateway {
    fn list(&mut self) -> Result<Vec<Sentiment>>;
    fn create(&mut self, text: &str, polarity: Polarity, client_id: ClientId) -> Result<Sentiment>;
    fn update(&mut self, id: SentimentId, text: &str, polarity: Polarity) -> Result<Sentiment>;
    fn remove(&mut self, id: SentimentId) -> Result<()>;
}

/// How a submission ended: the gateway was driven, or a local precondition
/// failed and the operation was skipped without issuing any request. A skip
/// is silent; the form keeps its contents for correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Skipped,
}

/// Scratch copy of the editable fields of the client under edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEdit {
    pub id: ClientId,
    pub email: String,
}

/// Scratch copy of the editable fields of the sentiment under edit. The
/// owning client is absent on purpose: it is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentEdit {
    pub id: SentimentId,
    pub text: String,
    pub polarity: Polarity,
}

/// Single-writer state for the console: both record collections, the two
/// inline-edit cursors, and the add-form scratch fields.
///
/// Collections change only through `refresh_clients`/`refresh_sentiments`.
/// Every successful mutation reloads the affected collection wholesale from
/// the gateway; nothing is patched locally, so the rendered rows are always
/// the last confirmed server read. A failed gateway call leaves collections,
/// cursors, and scratch fields exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: Mode,
    pub active_tab: TabKind,
    pub clients: Vec<Client>,
    pub sentiments: Vec<Sentiment>,
    pub client_edit: Option<ClientEdit>,
    pub sentiment_edit: Option<SentimentEdit>,
    pub new_email: String,
    pub new_text: String,
    pub new_polarity: Polarity,
    pub new_client_id: Option<ClientId>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::Nav,
            active_tab: TabKind::Clients,
            clients: Vec::new(),
            sentiments: Vec::new(),
            client_edit: None,
            sentiment_edit: None,
            new_email: String::new(),
            new_text: String::new(),
            new_polarity: Polarity::Positive,
            new_client_id: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    OpenForm,
    CloseForm,
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(Mode),
    TabChanged(TabKind),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::OpenForm => {
                self.mode = Mode::Form;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::CloseForm => {
                self.mode = Mode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_line = Some(message.to_owned());
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![AppEvent::TabChanged(self.active_tab)]
    }

    /// Replaces the client collection with a fresh gateway read. An edit
    /// cursor or form selection pointing at a record that did not survive
    /// the reload is released so nothing keeps referencing a stale id.
    pub fn refresh_clients(&mut self, gateway: &mut dyn ClientGateway) -> Result<()> {
        self.clients = gateway.list()?;
        if let Some(edit) = &self.client_edit
            && !self.contains_client(edit.id)
        {
            self.client_edit = None;
        }
        if let Some(selected) = self.new_client_id
            && !self.contains_client(selected)
        {
            self.new_client_id = None;
        }
        Ok(())
    }

    /// Replaces the sentiment collection with a fresh gateway read, releasing
    /// an edit cursor whose record disappeared.
    pub fn refresh_sentiments(&mut self, gateway: &mut dyn SentimentGateway) -> Result<()> {
        self.sentiments = gateway.list()?;
        if let Some(edit) = &self.sentiment_edit
            && !self.contains_sentiment(edit.id)
        {
            self.sentiment_edit = None;
        }
        Ok(())
    }

    /// Creates a client from the add-form scratch email. Blank input skips
    /// the whole operation. The scratch field is cleared only once the
    /// gateway confirms the create.
    pub fn add_client(&mut self, gateway: &mut dyn ClientGateway) -> Result<Outcome> {
        let Some(email) = normalized_required(&self.new_email) else {
            return Ok(Outcome::Skipped);
        };
        gateway.create(&email)?;
        self.new_email.clear();
        self.refresh_clients(gateway)?;
        Ok(Outcome::Done)
    }

    /// Points the client edit cursor at `id`, seeding the scratch email from
    /// the record's current value. A previously active cursor is replaced.
    /// An id that is not in the collection activates nothing.
    pub fn begin_edit_client(&mut self, id: ClientId) {
        let Some(client) = self.clients.iter().find(|client| client.id == id) else {
            return;
        };
        self.client_edit = Some(ClientEdit {
            id,
            email: client.email.clone(),
        });
    }

    /// Saves the client under edit. Without an active cursor, or with a blank
    /// scratch email, nothing is sent and the cursor keeps its state. The
    /// cursor deactivates only on a confirmed update.
    pub fn save_client(&mut self, gateway: &mut dyn ClientGateway) -> Result<Outcome> {
        let Some(edit) = &self.client_edit else {
            return Ok(Outcome::Skipped);
        };
        let Some(email) = normalized_required(&edit.email) else {
            return Ok(Outcome::Skipped);
        };
        gateway.update(edit.id, &email)?;
        self.client_edit = None;
        self.refresh_clients(gateway)?;
        Ok(Outcome::Done)
    }

    pub fn cancel_edit_client(&mut self) {
        self.client_edit = None;
    }

    /// Deletes a client. A cursor pointing at the deleted record is released
    /// before the reload, so even a failing reload cannot leave it on an id
    /// that no longer exists.
    pub fn remove_client(&mut self, gateway: &mut dyn ClientGateway, id: ClientId) -> Result<()> {
        gateway.remove(id)?;
        if self.client_edit.as_ref().is_some_and(|edit| edit.id == id) {
            self.client_edit = None;
        }
        self.refresh_clients(gateway)?;
        Ok(())
    }

    /// Creates a sentiment from the add-form scratch fields. Requires both a
    /// non-blank text and a selected client; otherwise the operation skips
    /// without a request. After a confirmed create the scratch resets to its
    /// defaults (empty text, positive, no client selected).
    pub fn add_sentiment(&mut self, gateway: &mut dyn SentimentGateway) -> Result<Outcome> {
        let Some(text) = normalized_required(&self.new_text) else {
            return Ok(Outcome::Skipped);
        };
        let Some(client_id) = self.new_client_id else {
            return Ok(Outcome::Skipped);
        };
        gateway.create(&text, self.new_polarity, client_id)?;
        self.new_text.clear();
        self.new_polarity = Polarity::Positive;
        self.new_client_id = None;
        self.refresh_sentiments(gateway)?;
        Ok(Outcome::Done)
    }

    pub fn begin_edit_sentiment(&mut self, id: SentimentId) {
        let Some(sentiment) = self.sentiments.iter().find(|sentiment| sentiment.id == id) else {
            return;
        };
        self.sentiment_edit = Some(SentimentEdit {
            id,
            text: sentiment.text.clone(),
            polarity: sentiment.polarity,
        });
    }

    /// Saves the sentiment under edit: text and polarity only, the owning
    /// client stays whatever creation established.
    pub fn save_sentiment(&mut self, gateway: &mut dyn SentimentGateway) -> Result<Outcome> {
        let Some(edit) = &self.sentiment_edit else {
            return Ok(Outcome::Skipped);
        };
        let Some(text) = normalized_required(&edit.text) else {
            return Ok(Outcome::Skipped);
        };
        gateway.update(edit.id, &text, edit.polarity)?;
        self.sentiment_edit = None;
        self.refresh_sentiments(gateway)?;
        Ok(Outcome::Done)
    }

    pub fn cancel_edit_sentiment(&mut self) {
        self.sentiment_edit = None;
    }

    pub fn remove_sentiment(
        &mut self,
        gateway: &mut dyn SentimentGateway,
        id: SentimentId,
    ) -> Result<()> {
        gateway.remove(id)?;
        if self
            .sentiment_edit
            .as_ref()
            .is_some_and(|edit| edit.id == id)
        {
            self.sentiment_edit = None;
        }
        self.refresh_sentiments(gateway)?;
        Ok(())
    }

    pub fn positive_count(&self) -> usize {
        self.polarity_count(Polarity::Positive)
    }

    pub fn negative_count(&self) -> usize {
        self.polarity_count(Polarity::Negative)
    }

    /// Resolves a sentiment's owning client to its email, or the unknown
    /// sentinel when the sentiment carries no reference or the client is
    /// missing from the local collection (deleted remotely, or not loaded
    /// yet). Never fails; staleness renders, it does not raise.
    pub fn resolve_client_email(&self, sentiment: &Sentiment) -> &str {
        let Some(client_id) = sentiment.client_id else {
            return UNKNOWN_CLIENT;
        };
        self.clients
            .iter()
            .find(|client| client.id == client_id)
            .map_or(UNKNOWN_CLIENT, |client| client.email.as_str())
    }

    fn polarity_count(&self, polarity: Polarity) -> usize {
        self.sentiments
            .iter()
            .filter(|sentiment| sentiment.polarity == polarity)
            .count()
    }

    fn contains_client(&self, id: ClientId) -> bool {
        self.clients.iter().any(|client| client.id == id)
    }

    fn contains_sentiment(&self, id: SentimentId) -> bool {
        self.sentiments.iter().any(|sentiment| sentiment.id == id)
    }
}
