use std::fmt;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ProblemId(String);

impl ProblemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProblemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProblemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Judge result of one submission, normalized across services.
#[derive(
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verdict {
    /// Waiting for judge or still running.
    Wj,
    Ac,
    Wa,
    Tle,
    Mle,
    Ole,
    Re,
    Ce,
    /// Internal error on the judge side.
    Ie,
}

impl Verdict {
    pub fn is_final(self) -> bool {
        self != Self::Wj
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.into())
    }
}

#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Submission {
    #[get = "pub"]
    id: String,
    #[get = "pub"]
    problem_id: ProblemId,
    #[get_copy = "pub"]
    verdict: Verdict,
}

impl Submission {
    pub fn new(id: impl Into<String>, problem_id: impl Into<ProblemId>, verdict: Verdict) -> Self {
        Self {
            id: id.into(),
            problem_id: problem_id.into(),
            verdict,
        }
    }
}
