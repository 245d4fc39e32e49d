use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use thiserror::Error;

use crate::adapter::Adapter;
use crate::config::SessionConfig;
use crate::model::{Account, AccountKey};
use crate::session::{AdapterDataStore, DataBag};

/// Why an adapter could not be built for an account.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateAdapterError {
    #[error("Unsupported account type: {0}")]
    UnknownKind(String),
    #[error("Could not set up adapter for {key}: {reason}")]
    InvalidAccount { key: AccountKey, reason: String },
}

impl CreateAdapterError {
    pub fn invalid(account: &Account, reason: impl Into<String>) -> Self {
        Self::InvalidAccount {
            key: account.key(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(account: &Account, field: &str) -> Self {
        Self::invalid(account, format!("missing `{}` in account record", field))
    }
}

/// What a constructor may touch while building an adapter.
#[derive(Debug)]
pub struct AdapterContext<'a> {
    data: &'a mut AdapterDataStore,
    conf: &'a SessionConfig,
}

impl<'a> AdapterContext<'a> {
    pub fn new(data: &'a mut AdapterDataStore, conf: &'a SessionConfig) -> Self {
        Self { data, conf }
    }

    /// Shared handle to the bookkeeping of service type `kind`.
    ///
    /// The handle may be kept by the adapter and stays attached to the
    /// session's store.
    pub fn data(&mut self, kind: &str) -> DataBag {
        self.data.get_or_create(kind)
    }

    pub fn conf(&self) -> &SessionConfig {
        self.conf
    }
}

/// Builds the adapter for an account.
///
/// Implementations must not block or touch the network here; they only
/// prepare an object whose operations run later.
pub trait AdapterFactory {
    fn create(
        &self,
        ctx: &mut AdapterContext<'_>,
        account: &Account,
    ) -> Result<Box<dyn Adapter>, CreateAdapterError>;
}

pub type Constructor =
    Box<dyn Fn(&mut AdapterContext<'_>, &Account) -> Result<Box<dyn Adapter>, CreateAdapterError>>;

/// Factory that dispatches on the lowercased account type.
#[derive(Default)]
pub struct AdapterRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ctor` for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: &str, ctor: F) -> &mut Self
    where
        F: Fn(&mut AdapterContext<'_>, &Account) -> Result<Box<dyn Adapter>, CreateAdapterError>
            + 'static,
    {
        let kind = kind.to_lowercase();
        debug!("Registering adapter constructor for {}", kind);
        self.constructors.insert(kind, Box::new(ctor));
        self
    }

    pub fn with<F>(mut self, kind: &str, ctor: F) -> Self
    where
        F: Fn(&mut AdapterContext<'_>, &Account) -> Result<Box<dyn Adapter>, CreateAdapterError>
            + 'static,
    {
        self.register(kind, ctor);
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.constructors.contains_key(&kind.to_lowercase())
    }
}

impl AdapterFactory for AdapterRegistry {
    fn create(
        &self,
        ctx: &mut AdapterContext<'_>,
        account: &Account,
    ) -> Result<Box<dyn Adapter>, CreateAdapterError> {
        let kind = account.kind().to_lowercase();
        let ctor = self
            .constructors
            .get(&kind)
            .ok_or_else(|| CreateAdapterError::UnknownKind(account.kind().clone()))?;
        ctor(ctx, account)
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
