//! View synchronization
//!
//! [`PinView`] is the pure state machine behind the map: list state,
//! the modal, and the latest-wins refresh guard. [`ViewController`] drives
//! it against the repository and session store.
//!
//! Every refresh takes a ticket. Only the completion carrying the newest
//! ticket may touch state, so a slow early fetch can never overwrite the
//! result of a later one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::client::models::Pin;
use crate::countdown::{Countdown, Remaining};
use crate::error::Error;
use crate::policy::can_modify;
use crate::session::Session;

mod driver;

pub use driver::{ViewCommand, ViewController, ViewSink};

/// Where the pin list is in its fetch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; the previous pins are still shown
    Error(String),
}

/// Which form the auth modal shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

/// The single active modal, if any
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    None,
    AddPin,
    Auth(AuthMode),
    EditPin(Pin),
    ConfirmDelete(Pin),
}

/// Issue number of a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// One rendered pin
#[derive(Debug, Clone, PartialEq)]
pub struct PinRow {
    pub pin: Pin,
    pub remaining: Remaining,
    pub can_modify: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub state: SyncState,
    pub modal: Modal,
    pub form_error: Option<String>,
    pub rows: Vec<PinRow>,
    pub viewer: String,
    pub at: DateTime<Utc>,
}

/// Pin collection plus modal state, owned by one controller
#[derive(Debug)]
pub struct PinView {
    pins: Vec<Pin>,
    countdowns: HashMap<String, Countdown>,
    state: SyncState,
    modal: Modal,
    form_error: Option<String>,
    issued: u64,
}

impl Default for PinView {
    fn default() -> Self {
        Self::new()
    }
}

impl PinView {
    pub fn new() -> Self {
        Self {
            pins: Vec::new(),
            countdowns: HashMap::new(),
            state: SyncState::Idle,
            modal: Modal::None,
            form_error: None,
            issued: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    #[cfg(test)]
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    #[cfg(test)]
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn find(&self, id: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    // ------------------------------------------------------------------
    // Refresh cycle
    // ------------------------------------------------------------------

    /// Enter Loading and hand out the next ticket.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        self.state = SyncState::Loading;
        debug!("Issued refresh #{}", self.issued);
        RefreshTicket(self.issued)
    }

    fn is_current(&self, ticket: RefreshTicket) -> bool {
        if ticket.0 == self.issued {
            return true;
        }
        debug!(
            "Dropping stale refresh #{} (latest is #{})",
            ticket.0, self.issued
        );
        false
    }

    /// Replace the whole collection. Returns false if the ticket is stale.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, pins: Vec<Pin>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        debug!("Applied refresh #{} with {} pins", ticket.0, pins.len());

        let mut countdowns = HashMap::with_capacity(pins.len());
        for pin in &pins {
            // Keep an expired latch only while the expiry itself is unchanged
            let countdown = match self.countdowns.remove(&pin.id) {
                Some(existing) if existing.expires_at() == pin.expires_at => existing,
                _ => Countdown::new(pin.expires_at),
            };
            countdowns.insert(pin.id.clone(), countdown);
        }
        self.countdowns = countdowns;

        // Point the edit modal at the fresh copy, or drop it if the pin is gone
        if let Modal::EditPin(editing) | Modal::ConfirmDelete(editing) = &mut self.modal {
            match pins.iter().find(|p| p.id == editing.id) {
                Some(fresh) => *editing = fresh.clone(),
                None => self.modal = Modal::None,
            }
        }

        self.pins = pins;
        self.state = SyncState::Ready;
        true
    }

    /// Record a failed fetch, keeping the previous pins.
    pub fn fail_refresh(&mut self, ticket: RefreshTicket, err: &Error) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        warn!("Refresh #{} failed, keeping previous pins: {}", ticket.0, err);
        self.state = SyncState::Error(err.to_string());
        true
    }

    // ------------------------------------------------------------------
    // Modals
    // ------------------------------------------------------------------

    fn set_modal(&mut self, modal: Modal) {
        self.modal = modal;
        self.form_error = None;
    }

    /// Open the add form, or the login form for anonymous users.
    pub fn open_add_pin(&mut self, session: &Session) -> &Modal {
        if session.is_authenticated() {
            self.set_modal(Modal::AddPin);
        } else {
            self.set_modal(Modal::Auth(AuthMode::Login));
        }
        &self.modal
    }

    pub fn open_auth(&mut self, mode: AuthMode) {
        self.set_modal(Modal::Auth(mode));
    }

    /// Open the edit form if the pin exists and the session may change it.
    pub fn open_edit(&mut self, session: &Session, id: &str) -> bool {
        match self.find(id) {
            Some(pin) if can_modify(session, pin) => {
                let pin = pin.clone();
                self.set_modal(Modal::EditPin(pin));
                true
            }
            _ => false,
        }
    }

    /// Ask for confirmation before deleting a pin.
    pub fn request_delete(&mut self, session: &Session, id: &str) -> bool {
        match self.find(id) {
            Some(pin) if can_modify(session, pin) => {
                let pin = pin.clone();
                self.set_modal(Modal::ConfirmDelete(pin));
                true
            }
            _ => false,
        }
    }

    pub fn close_modal(&mut self) {
        self.set_modal(Modal::None);
    }

    /// Inline error for the open form; the modal stays open.
    pub fn record_failure(&mut self, err: &Error) {
        self.form_error = Some(err.to_string());
    }

    /// Close the form and start the authoritative re-fetch.
    pub fn mutation_succeeded(&mut self) -> RefreshTicket {
        self.close_modal();
        self.begin_refresh()
    }

    /// Signup leads to the login form rather than a session.
    pub fn signup_succeeded(&mut self) {
        self.set_modal(Modal::Auth(AuthMode::Login));
    }

    /// Back to the default view.
    pub fn logged_out(&mut self) {
        self.close_modal();
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Rows for the current frame, soonest expiry first.
    ///
    /// Authorization is evaluated here, per frame, against the session the
    /// caller passes in.
    pub fn rows(&mut self, session: &Session, now: DateTime<Utc>, include_expired: bool) -> Vec<PinRow> {
        let mut rows: Vec<PinRow> = self
            .pins
            .iter()
            .filter_map(|pin| {
                let remaining = self
                    .countdowns
                    .entry(pin.id.clone())
                    .or_insert_with(|| Countdown::new(pin.expires_at))
                    .tick(now);
                if remaining.is_expired() && !include_expired {
                    return None;
                }
                Some(PinRow {
                    pin: pin.clone(),
                    remaining,
                    can_modify: can_modify(session, pin),
                })
            })
            .collect();

        rows.sort_by_key(|row| row.pin.expires_at);
        rows
    }

    pub fn snapshot(&mut self, session: &Session, now: DateTime<Utc>, include_expired: bool) -> ViewSnapshot {
        ViewSnapshot {
            rows: self.rows(session, now, include_expired),
            state: self.state.clone(),
            modal: self.modal.clone(),
            form_error: self.form_error.clone(),
            viewer: session.display_name().to_string(),
            at: now,
        }
    }
}
