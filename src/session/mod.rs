//! The account registry and the single adapter bound to the current account.

use std::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::abs_path::AbsPathBuf;
use crate::adapter::{
    self, Adapter, AdapterContext, AdapterFactory, CreateAdapterError, LoginOutcome, Pending,
    SendOutcome, StatusOutcome,
};
use crate::config::SessionConfig;
use crate::model::{Account, AccountKey, ProblemId};
use crate::{Console, Result};

mod snapshot;
mod store;

pub use snapshot::Snapshot;
pub use store::{AdapterDataStore, DataBag};

/// Result of [`Session::add`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AddOutcome {
    Inserted,
    Replaced,
}

impl AddOutcome {
    pub fn is_replaced(self) -> bool {
        self == Self::Replaced
    }
}

/// Why [`Session::try_use`] left the current account unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    #[error("Account not found: {0}")]
    NotFound(AccountKey),
    #[error(transparent)]
    Adapter(#[from] CreateAdapterError),
}

/// The current account together with the adapter built for it.
struct Binding {
    key: AccountKey,
    adapter: Box<dyn Adapter>,
}

pub struct Session {
    factory: Box<dyn AdapterFactory>,
    conf: SessionConfig,
    accounts: Vec<Account>,
    adapter_data: AdapterDataStore,
    current: Option<Binding>,
}

impl Session {
    pub fn new(factory: impl AdapterFactory + 'static, conf: SessionConfig) -> Self {
        Self {
            factory: Box::new(factory),
            conf,
            accounts: Vec::new(),
            adapter_data: AdapterDataStore::default(),
            current: None,
        }
    }

    /// Replaces all state with `snapshot`.
    ///
    /// A current-account pointer that matches no account, or whose adapter
    /// cannot be built, leaves the session with no current account.
    pub fn load(&mut self, snapshot: Snapshot) {
        if let Some(msg) = self.restore(snapshot) {
            warn!("{}", msg);
        }
    }

    /// Detached copy of the state, as it would be saved.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            adap_data: self.adapter_data.deep_clone(),
            ..Snapshot::new(self.accounts.clone(), self.current_key())
        }
    }

    /// Loads the snapshot file at `path`. A missing file yields an empty session.
    ///
    /// Unreadable or malformed files are errors and leave the session untouched.
    /// A dropped current account is also reported on `cnsl`.
    pub fn load_from(&mut self, path: &AbsPathBuf, cnsl: &mut Console) -> Result<()> {
        if !path.exists() {
            info!("No snapshot found at {}, starting without accounts", path);
            self.load(Snapshot::default());
            return Ok(());
        }
        let snapshot = path.load_pretty(Snapshot::read_from, None, cnsl)?;
        if let Some(msg) = self.restore(snapshot) {
            warn!("{}", msg);
            cnsl.warn(&msg)?;
        }
        Ok(())
    }

    /// Overwrites `path` with the current state, readable by the owner only.
    pub fn save_to(&self, path: &AbsPathBuf, cnsl: &mut Console) -> Result<()> {
        let snapshot = self.snapshot();
        path.save_pretty(|file| snapshot.write_to(file), true, None, cnsl)?;
        Ok(())
    }

    pub fn adapter_data(&mut self, kind: &str) -> DataBag {
        self.adapter_data.get_or_create(kind)
    }

    /// Starts login on the bound adapter. `None` if no adapter is bound.
    pub fn login(&mut self) -> Option<Pending<LoginOutcome>> {
        let binding = self.current.as_mut()?;
        let (done, pending) = adapter::channel();
        debug!("Dispatching login for {}", binding.key);
        binding.adapter.login(done);
        Some(pending)
    }

    /// Starts submission of `source_path` for `problem_id`. `None` if no adapter is bound.
    pub fn send(
        &mut self,
        problem_id: &ProblemId,
        source_path: &AbsPathBuf,
    ) -> Option<Pending<SendOutcome>> {
        let binding = self.current.as_mut()?;
        let (done, pending) = adapter::channel();
        debug!("Dispatching send of {} for {}", problem_id, binding.key);
        binding.adapter.send(problem_id, source_path, done);
        Some(pending)
    }

    /// Starts fetching submission status. `None` if no adapter is bound.
    pub fn fetch_status(&mut self) -> Option<Pending<StatusOutcome>> {
        let binding = self.current.as_mut()?;
        let (done, pending) = adapter::channel();
        debug!("Dispatching status fetch for {}", binding.key);
        binding.adapter.fetch_status(done);
        Some(pending)
    }

    /// Appends `account`, or replaces the stored one with the same identity in place.
    ///
    /// Replacing the current account keeps the adapter built from the old
    /// record; call [`use_account`](Self::use_account) again to rebuild it.
    pub fn add(&mut self, account: Account) -> AddOutcome {
        match self.position(account.kind(), account.user()) {
            Some(idx) => {
                if self.is_current(account.kind(), account.user()) {
                    warn!(
                        "Replaced current account {}; the bound adapter still uses the previous record",
                        account.key()
                    );
                }
                self.accounts[idx] = account;
                AddOutcome::Replaced
            }
            None => {
                self.accounts.push(account);
                AddOutcome::Inserted
            }
        }
    }

    /// Removes an account. Returns false for the current account or an unknown one.
    pub fn remove(&mut self, kind: &str, user: &str) -> bool {
        if self.is_current(kind, user) {
            debug!("Refused to remove current account {}@{}", user, kind);
            return false;
        }
        match self.position(kind, user) {
            Some(idx) => {
                self.accounts.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&Account> {
        let key = &self.current.as_ref()?.key;
        self.accounts.iter().find(|account| account.matches_key(key))
    }

    pub fn current_key(&self) -> Option<&AccountKey> {
        self.current.as_ref().map(|binding| &binding.key)
    }

    pub fn is_bound(&self) -> bool {
        self.current.is_some()
    }

    pub fn use_none(&mut self) {
        if let Some(binding) = self.current.take() {
            debug!("Unbound {}", binding.key);
        }
    }

    /// Makes the account current. Returns false, changing nothing, if the
    /// account is unknown or its adapter cannot be built.
    pub fn use_account(&mut self, kind: &str, user: &str) -> bool {
        match self.try_use(kind, user) {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not switch to {}@{}: {}", user, kind, err);
                false
            }
        }
    }

    /// Same as [`use_account`](Self::use_account), reporting why a switch failed.
    pub fn try_use(&mut self, kind: &str, user: &str) -> std::result::Result<(), SwitchError> {
        let binding = self.bind(&AccountKey::new(kind, user))?;
        info!("Switched current account to {}", binding.key);
        self.current = Some(binding);
        Ok(())
    }

    /// All accounts in insertion order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Replaces all state, returning why the current account was dropped, if it was.
    fn restore(&mut self, snapshot: Snapshot) -> Option<String> {
        let current_key = snapshot.current_key();
        let Snapshot {
            adap_data, accts, ..
        } = snapshot;
        self.adapter_data = adap_data;
        self.accounts = accts;
        self.current = None;

        let key = current_key?;
        match self.bind(&key) {
            Ok(binding) => {
                debug!("Restored current account {}", binding.key);
                self.current = Some(binding);
                None
            }
            Err(err) => Some(format!("Dropped current account {} on load: {}", key, err)),
        }
    }

    fn bind(&mut self, key: &AccountKey) -> std::result::Result<Binding, SwitchError> {
        let idx = self
            .position(key.kind(), key.user())
            .ok_or_else(|| SwitchError::NotFound(key.clone()))?;
        let account = &self.accounts[idx];
        let mut ctx = AdapterContext::new(&mut self.adapter_data, &self.conf);
        let adapter = self.factory.create(&mut ctx, account)?;
        Ok(Binding {
            key: account.key(),
            adapter,
        })
    }

    fn position(&self, kind: &str, user: &str) -> Option<usize> {
        self.accounts
            .iter()
            .position(|account| account.matches(kind, user))
    }

    fn is_current(&self, kind: &str, user: &str) -> bool {
        self.current
            .as_ref()
            .map_or(false, |binding| binding.key.kind() == kind && binding.key.user() == user)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Session")
            .field("accounts", &self.accounts)
            .field("current", &self.current_key())
            .field("adapter_data", &self.adapter_data)
            .finish()
    }
}
