use std::io;

use anyhow::Context as _;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::{Account, AccountKey};
use crate::session::AdapterDataStore;
use crate::Result;

/// Persisted form of a session.
///
/// ```json
/// {"curAcct":["uva","alice"],"adapData":{"uva":{}},"accts":[{"type":"uva","user":"alice"}]}
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// `[type, user]` of the current account. Any other shape means none.
    #[serde(default, deserialize_with = "lenient_pair")]
    pub cur_acct: Option<Vec<String>>,
    #[serde(default)]
    pub adap_data: AdapterDataStore,
    #[serde(default)]
    pub accts: Vec<Account>,
}

impl Snapshot {
    pub fn new(accts: Vec<Account>, current: Option<&AccountKey>) -> Self {
        Self {
            cur_acct: current.map(|key| vec![key.kind().clone(), key.user().clone()]),
            adap_data: AdapterDataStore::default(),
            accts,
        }
    }

    pub fn current_key(&self) -> Option<AccountKey> {
        match self.cur_acct.as_deref() {
            Some([kind, user]) => Some(AccountKey::new(kind, user)),
            _ => None,
        }
    }

    pub fn read_from(reader: impl io::Read) -> Result<Self> {
        serde_json::from_reader(io::BufReader::new(reader)).context("Could not read snapshot as json")
    }

    pub fn write_to(&self, writer: impl io::Write) -> Result<()> {
        let mut writer = io::BufWriter::new(writer);
        serde_json::to_writer(&mut writer, self).context("Could not write snapshot as json")?;
        io::Write::flush(&mut writer).context("Could not flush snapshot")?;
        Ok(())
    }
}

/// Reads `curAcct` without failing: anything but an array of strings is `None`.
fn lenient_pair<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(pair) => Ok(Some(pair)),
        Err(err) => {
            debug!("Ignored malformed current account pointer: {}", err);
            Ok(None)
        }
    }
}
