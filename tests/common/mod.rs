use std::cell::RefCell;
use std::rc::Rc;

use jsub::abs_path::AbsPathBuf;
use jsub::adapter::{
    Adapter, AdapterRegistry, Completion, CreateAdapterError, LoginOutcome, SendOutcome,
    StatusOutcome,
};
use jsub::model::{ProblemId, Submission, Verdict};
use jsub::{Session, SessionConfig};

/// Record of what stub adapters were asked to do, shared with the test.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<String>,
    /// Status requests left unanswered by adapters built with `hold: true`.
    pub held: Vec<(String, Completion<StatusOutcome>)>,
}

pub type SharedRecorder = Rc<RefCell<Recorder>>;

pub struct StubAdapter {
    user: String,
    hold: bool,
    recorder: SharedRecorder,
}

impl Adapter for StubAdapter {
    fn login(&mut self, done: Completion<LoginOutcome>) {
        self.recorder
            .borrow_mut()
            .calls
            .push(format!("login {}", self.user));
        done.succeed(LoginOutcome {
            kind: "uva".into(),
            user: self.user.clone(),
            is_already: false,
        });
    }

    fn send(&mut self, problem_id: &ProblemId, source_path: &AbsPathBuf, done: Completion<SendOutcome>) {
        self.recorder
            .borrow_mut()
            .calls
            .push(format!("send {} {} {}", self.user, problem_id, source_path));
        done.succeed(SendOutcome {
            problem_id: problem_id.clone(),
            submission_id: Some(format!("{}-{}", self.user, problem_id)),
        });
    }

    fn fetch_status(&mut self, done: Completion<StatusOutcome>) {
        let mut recorder = self.recorder.borrow_mut();
        recorder.calls.push(format!("status {}", self.user));
        if self.hold {
            recorder.held.push((self.user.clone(), done));
        } else {
            done.succeed(StatusOutcome {
                submissions: vec![Submission::new("1", "100", Verdict::Ac)],
            });
        }
    }
}

/// A session whose `uva` adapter records calls into the returned recorder.
///
/// Accounts with `"hold": true` get an adapter that keeps status requests
/// pending; accounts with `"pass": null` cannot be bound.
pub fn recording_session() -> (Session, SharedRecorder) {
    let recorder = SharedRecorder::default();
    let shared = Rc::clone(&recorder);
    let registry = AdapterRegistry::new().with("uva", move |_ctx, account| {
        if account.payload().get("pass").map_or(false, |pass| pass.is_null()) {
            return Err(CreateAdapterError::missing_field(account, "pass"));
        }
        Ok(Box::new(StubAdapter {
            user: account.user().clone(),
            hold: account.payload().get("hold").and_then(|v| v.as_bool()).unwrap_or(false),
            recorder: Rc::clone(&shared),
        }))
    });
    (Session::new(registry, SessionConfig::default()), recorder)
}
