//! Contract between a [`Session`](crate::Session) and the per-service
//! adapters it binds to the current account.

use std::fmt;

use serde::Serialize;

use crate::abs_path::AbsPathBuf;
use crate::model::{ProblemId, Submission};

pub mod completion;
mod registry;

pub use completion::{channel, Completion, Pending};
pub use registry::{AdapterContext, AdapterFactory, AdapterRegistry, Constructor, CreateAdapterError};

/// Protocol-specific client bound to one account.
///
/// Every method starts work and returns immediately. The adapter reports the
/// outcome through `done`, from whatever task or callback finishes the work.
pub trait Adapter {
    fn login(&mut self, done: Completion<LoginOutcome>);

    fn send(
        &mut self,
        problem_id: &ProblemId,
        source_path: &AbsPathBuf,
        done: Completion<SendOutcome>,
    );

    fn fetch_status(&mut self, done: Completion<StatusOutcome>);
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginOutcome {
    pub kind: String,
    pub user: String,
    pub is_already: bool,
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_already {
            write!(f, "Already logged in to {} as {}", self.kind, self.user)
        } else {
            write!(f, "Successfully logged in to {} as {}", self.kind, self.user)
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SendOutcome {
    pub problem_id: ProblemId,
    pub submission_id: Option<String>,
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.submission_id {
            Some(id) => write!(f, "Submitted {} (submission {})", self.problem_id, id),
            None => write!(f, "Submitted {}", self.problem_id),
        }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StatusOutcome {
    pub submissions: Vec<Submission>,
}

impl fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.submissions.is_empty() {
            return f.write_str("No submissions");
        }
        for (i, submission) in self.submissions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:>10} {:8} {}",
                submission.id(),
                submission.problem_id().as_str(),
                submission.verdict()
            )?;
        }
        Ok(())
    }
}
