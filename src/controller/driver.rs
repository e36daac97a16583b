//! Async driver for [`PinView`]
//!
//! One-shot methods (`refresh`, `create_pin`, ...) await inline and are what
//! the `pin` subcommands use. [`ViewController::run`] is the live loop used
//! by `watch`: commands, a one second tick, optional polling, and in-flight
//! requests all feed the same state, and every event ends in a render.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::{AuthMode, Modal, PinView, RefreshTicket, ViewSnapshot};
use crate::client::models::{Credentials, Pin, PinPatch};
use crate::error::{ApiError, Result};
use crate::repository::{NewPin, PinRepository};
use crate::session::{Session, SessionStore, TokenStore};

/// Countdown redraw cadence
const TICK: Duration = Duration::from_secs(1);

/// Wall clock source, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(at),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Receives a frame after every event of the live loop.
pub trait ViewSink: Send {
    fn render(&mut self, snapshot: &ViewSnapshot) -> Result<()>;
}

/// Input to the live loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Refresh,
    /// Open the delete confirmation for a pin
    RequestDelete(String),
    /// Accept the pending confirmation
    Confirm,
    CloseModal,
    Quit,
}

enum Outcome {
    Fetched(RefreshTicket, Result<Vec<Pin>>),
    Deleted(String, Result<()>),
}

/// Owns a [`PinView`] and runs its requests.
pub struct ViewController<T: TokenStore> {
    view: PinView,
    repo: PinRepository,
    sessions: Arc<SessionStore<T>>,
    session: Session,
    clock: Arc<dyn Clock>,
    refresh_every: Option<Duration>,
    include_expired: bool,
    /// Pin whose DELETE is in flight in the live loop
    deleting: Option<String>,
}

impl<T: TokenStore + 'static> ViewController<T> {
    pub fn new(repo: PinRepository, sessions: Arc<SessionStore<T>>) -> Self {
        let session = sessions.current_session();
        Self {
            view: PinView::new(),
            repo,
            sessions,
            session,
            clock: Arc::new(SystemClock),
            refresh_every: None,
            include_expired: false,
            deleting: None,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self.session = self.sessions.current_session_at(self.clock.now());
        self
    }

    /// Poll the server on this interval while the live loop runs.
    pub fn with_refresh_interval(mut self, every: Option<Duration>) -> Self {
        self.refresh_every = every.filter(|d| !d.is_zero());
        self
    }

    /// Keep expired pins in rendered frames.
    pub fn include_expired(mut self, include: bool) -> Self {
        self.include_expired = include;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> &PinView {
        &self.view
    }

    pub fn find(&self, id: &str) -> Option<&Pin> {
        self.view.find(id)
    }

    fn sync_session(&mut self) {
        self.session = self.sessions.current_session_at(self.clock.now());
    }

    /// Frame for "now". Re-derives the session once its token has lapsed.
    pub fn snapshot(&mut self) -> ViewSnapshot {
        let now = self.clock.now();
        if matches!(self.session.expires_at, Some(exp) if exp <= now) {
            debug!("Session expired; re-deriving");
            self.sync_session();
        }
        self.view.snapshot(&self.session, now, self.include_expired)
    }

    // ------------------------------------------------------------------
    // One-shot operations
    // ------------------------------------------------------------------

    async fn fetch(&mut self, ticket: RefreshTicket) -> Result<()> {
        match self.repo.list_pins().await {
            Ok(pins) => {
                self.view.complete_refresh(ticket, pins);
                Ok(())
            }
            Err(err) => {
                self.view.fail_refresh(ticket, &err);
                Err(err)
            }
        }
    }

    /// Fetch the full pin list and replace the collection.
    pub async fn refresh(&mut self) -> Result<()> {
        self.sync_session();
        let ticket = self.view.begin_refresh();
        self.fetch(ticket).await
    }

    /// Close the form and re-fetch on success; keep it open with an error
    /// otherwise.
    async fn settle<R>(&mut self, result: Result<R>) -> Result<R> {
        match result {
            Ok(value) => {
                let ticket = self.view.mutation_succeeded();
                if let Err(err) = self.fetch(ticket).await {
                    debug!("Refresh after mutation failed: {}", err);
                }
                Ok(value)
            }
            Err(err) => {
                self.view.record_failure(&err);
                Err(err)
            }
        }
    }

    fn lookup(&self, id: &str) -> Result<Pin> {
        self.view
            .find(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Pin {} not found", id)).into())
    }

    pub fn open_add_pin(&mut self) -> Modal {
        self.view.open_add_pin(&self.session).clone()
    }

    pub fn open_auth(&mut self, mode: AuthMode) {
        self.view.open_auth(mode);
    }

    pub fn open_edit(&mut self, id: &str) -> bool {
        self.view.open_edit(&self.session, id)
    }

    pub fn request_delete(&mut self, id: &str) -> bool {
        self.view.request_delete(&self.session, id)
    }

    pub fn close_modal(&mut self) {
        self.view.close_modal();
    }

    pub async fn create_pin(&mut self, input: &NewPin) -> Result<Pin> {
        let result = self.repo.create_pin(&self.session, input).await;
        self.settle(result).await
    }

    pub async fn update_pin(&mut self, id: &str, patch: &PinPatch) -> Result<Pin> {
        let result = match self.lookup(id) {
            Ok(pin) => {
                self.repo
                    .update_pin(&self.session, &pin, patch, self.clock.now())
                    .await
            }
            Err(err) => Err(err),
        };
        self.settle(result).await
    }

    /// Delete the pin awaiting confirmation.
    pub async fn confirm_delete(&mut self) -> Result<Pin> {
        let pin = match self.view.modal() {
            Modal::ConfirmDelete(pin) => pin.clone(),
            _ => return Err(ApiError::Validation("No deletion is pending.".to_string()).into()),
        };
        let result = self.repo.delete_pin(&self.session, &pin).await.map(|()| pin);
        self.settle(result).await
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<Session> {
        match self.sessions.login(credentials).await {
            Ok(session) => {
                self.session = session.clone();
                self.view.close_modal();
                Ok(session)
            }
            Err(err) => {
                self.view.record_failure(&err);
                Err(err)
            }
        }
    }

    pub async fn signup(&mut self, credentials: &Credentials) -> Result<()> {
        match self.sessions.signup(credentials).await {
            Ok(()) => {
                self.view.signup_succeeded();
                Ok(())
            }
            Err(err) => {
                self.view.record_failure(&err);
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        self.sessions.logout()?;
        self.session = Session::anonymous();
        self.view.logged_out();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Live loop
    // ------------------------------------------------------------------

    fn spawn_fetch(&self, ticket: RefreshTicket, tasks: &mut JoinSet<Outcome>) {
        let repo = self.repo.clone();
        tasks.spawn(async move { Outcome::Fetched(ticket, repo.list_pins().await) });
    }

    fn spawn_refresh(&mut self, tasks: &mut JoinSet<Outcome>) {
        self.sync_session();
        let ticket = self.view.begin_refresh();
        self.spawn_fetch(ticket, tasks);
    }

    fn handle(&mut self, command: ViewCommand, tasks: &mut JoinSet<Outcome>) {
        debug!("View command: {:?}", command);
        match command {
            ViewCommand::Refresh => self.spawn_refresh(tasks),
            ViewCommand::RequestDelete(id) => {
                if !self.request_delete(&id) {
                    let err = match self.view.find(&id) {
                        None => ApiError::NotFound(format!("Pin {} not found", id)),
                        Some(_) => ApiError::Forbidden("You can only change your own pins.".to_string()),
                    };
                    self.view.record_failure(&err.into());
                }
            }
            ViewCommand::Confirm => {
                if let Some(id) = &self.deleting {
                    debug!("Delete of {} already in flight", id);
                    return;
                }
                if let Modal::ConfirmDelete(pin) = self.view.modal().clone() {
                    let repo = self.repo.clone();
                    let session = self.session.clone();
                    self.deleting = Some(pin.id.clone());
                    tasks.spawn(async move {
                        let result = repo.delete_pin(&session, &pin).await;
                        Outcome::Deleted(pin.id, result)
                    });
                }
            }
            ViewCommand::CloseModal => self.view.close_modal(),
            ViewCommand::Quit => {}
        }
    }

    fn apply(&mut self, outcome: Outcome, tasks: &mut JoinSet<Outcome>) {
        match outcome {
            Outcome::Fetched(ticket, Ok(pins)) => {
                self.view.complete_refresh(ticket, pins);
            }
            Outcome::Fetched(ticket, Err(err)) => {
                self.view.fail_refresh(ticket, &err);
            }
            Outcome::Deleted(id, result) => {
                self.deleting = None;
                let confirming = matches!(self.view.modal(), Modal::ConfirmDelete(pin) if pin.id == id);
                match result {
                    Ok(()) if confirming => {
                        let ticket = self.view.mutation_succeeded();
                        self.spawn_fetch(ticket, tasks);
                    }
                    Ok(()) => self.spawn_refresh(tasks),
                    Err(err) if confirming => self.view.record_failure(&err),
                    Err(err) => warn!("Delete of {} failed: {}", id, err),
                }
            }
        }
    }

    /// Run until `Quit` or the command channel closes.
    ///
    /// Requests still in flight on exit are aborted, so nothing applies to
    /// the view after this returns.
    pub async fn run<S: ViewSink>(
        mut self,
        mut commands: mpsc::Receiver<ViewCommand>,
        sink: &mut S,
    ) -> Result<()> {
        let mut tasks = JoinSet::new();
        let mut ticker = time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut poller = self
            .refresh_every
            .map(|every| time::interval_at(Instant::now() + every, every));

        self.spawn_refresh(&mut tasks);

        let result = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(ViewCommand::Quit) => break Ok(()),
                    Some(command) => self.handle(command, &mut tasks),
                },
                Some(joined) = tasks.join_next() => match joined {
                    Ok(outcome) => self.apply(outcome, &mut tasks),
                    Err(err) => warn!("View task failed: {}", err),
                },
                _ = ticker.tick() => {}
                _ = next_poll(&mut poller) => {
                    debug!("Polling for pins");
                    self.spawn_refresh(&mut tasks);
                }
            }

            if let Err(err) = sink.render(&self.snapshot()) {
                break Err(err);
            }
        };

        tasks.shutdown().await;
        result
    }
}

async fn next_poll(poller: &mut Option<Interval>) {
    match poller {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
