use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use instant::Instant;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::wordle::{ConstraintErr, ConstraintsDto, ScoredCandidate, Solver, SuggestOptions, Suggestions, WordleFloat};

pub type CorrelationId = u64;

///
/// Runs a Solver on its own thread and talks to it with messages. Each request gets a correlation
/// id and its own reply channel, and can be cancelled by the caller at any point. Cancelling never
/// interrupts a computation in progress, the worker just throws the result away.
///
pub struct SolverAgent {
    requests: Option<mpsc::Sender<Job>>,
    next_id: AtomicU64,
    worker: Option<JoinHandle<()>>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum SolverReq {
    Suggest {
        constraints: ConstraintsDto,
        #[serde(default)]
        options: SuggestOptions,
    },
    DictionaryInfo,
    ReloadDictionary,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum SolverResp {
    Suggestions(SuggestionsDto),
    DictionaryInfo(DictionaryInfoDto),
    InvalidConstraints(ConstraintErr),
}

/// A message tagged with the id of the request it belongs to
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Envelope<T> {
    pub id: CorrelationId,
    pub body: T,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SuggestionsDto {
    pub suggestions: Vec<ScoredCandidateDto>,
    pub num_possible: usize,
}

impl From<Suggestions> for SuggestionsDto {
    fn from(other: Suggestions) -> Self {
        Self {
            suggestions: other.candidates
                .iter()
                .map(|c| ScoredCandidateDto::with_context(c, other.num_possible))
                .collect(),
            num_possible: other.num_possible,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ScoredCandidateDto {
    pub word: String,
    pub entropy: WordleFloat,
    pub frequency_score: u64,
    pub position_score: u32,
    pub win_probability: WordleFloat,
    pub expected_remaining: WordleFloat,
    pub explanation: String,
}

impl ScoredCandidateDto {
    fn with_context(other: &ScoredCandidate, num_possible: usize) -> Self {
        Self {
            word: other.word.to_string(),
            entropy: other.entropy,
            frequency_score: other.frequency_score,
            position_score: other.position_score,
            win_probability: other.win_probability,
            expected_remaining: other.expected_remaining,
            explanation: other.explanation(num_possible),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct DictionaryInfoDto {
    pub num_words: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentErr {
    #[error("the solver agent has shut down")]
    Closed,
    #[error("request {0} got no response within {1:?}")]
    Timeout(CorrelationId, Duration),
    #[error("request {0} was cancelled")]
    Cancelled(CorrelationId),
    #[error("expected a response to request {expected} but got one for {got}")]
    MismatchedId { expected: CorrelationId, got: CorrelationId },
}

/// Shared flag the caller flips to say it no longer wants the result
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct Job {
    request: Envelope<SolverReq>,
    cancel: CancelToken,
    reply: mpsc::Sender<Envelope<SolverResp>>,
}

/// A request that has been sent to the agent and may or may not have been answered yet
pub struct PendingCall {
    id: CorrelationId,
    cancel: CancelToken,
    responses: mpsc::Receiver<Envelope<SolverResp>>,
}

impl PendingCall {
    pub fn id(&self) -> CorrelationId {
        self.id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// For cancelling from somewhere else (another thread, a UI callback...)
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    ///
    /// Blocks until the response arrives, the timeout passes, or the request is cancelled. A
    /// request that times out is cancelled as well, so the worker skips it if it hasn't started.
    ///
    pub fn wait(self, timeout: Duration) -> Result<SolverResp, AgentErr> {
        match self.responses.recv_timeout(timeout) {
            Ok(_) if self.cancel.is_cancelled() => Err(AgentErr::Cancelled(self.id)),
            Ok(resp) if resp.id != self.id => Err(AgentErr::MismatchedId {
                expected: self.id,
                got: resp.id,
            }),
            Ok(resp) => Ok(resp.body),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.cancel.cancel();
                Err(AgentErr::Timeout(self.id, timeout))
            }
            // the worker drops the reply channel without answering when it skips a cancelled job
            Err(mpsc::RecvTimeoutError::Disconnected) if self.cancel.is_cancelled() => {
                Err(AgentErr::Cancelled(self.id))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(AgentErr::Closed),
        }
    }
}

impl SolverAgent {
    pub fn spawn(solver: Solver) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let worker = thread::spawn(move || run_worker(solver, rx));
        Self {
            requests: Some(tx),
            next_id: AtomicU64::new(1),
            worker: Some(worker),
        }
    }

    pub fn submit(&self, request: SolverReq) -> Result<PendingCall, AgentErr> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let cancel = CancelToken::new();
        let (reply, responses) = mpsc::channel();
        let job = Job {
            request: Envelope { id, body: request },
            cancel: cancel.clone(),
            reply,
        };

        self.requests
            .as_ref()
            .ok_or(AgentErr::Closed)?
            .send(job)
            .map_err(|_| AgentErr::Closed)?;

        Ok(PendingCall {
            id,
            cancel,
            responses,
        })
    }

    /// Submits and waits in one go
    pub fn call(&self, request: SolverReq, timeout: Duration) -> Result<SolverResp, AgentErr> {
        self.submit(request)?.wait(timeout)
    }
}

impl Drop for SolverAgent {
    fn drop(&mut self) {
        // closing the request channel ends the worker loop once queued jobs are drained
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("solver agent worker panicked");
            }
        }
    }
}

fn run_worker(solver: Solver, jobs: mpsc::Receiver<Job>) {
    log::debug!("solver agent started");
    for job in jobs {
        let id = job.request.id;
        if job.cancel.is_cancelled() {
            log::debug!("skipping cancelled request {}", id);
            continue;
        }

        log::debug!("worker msg {} {:?}", id, &job.request.body);
        let start_at = Instant::now();
        let body = handle_request(&solver, job.request.body);
        log::debug!("handled request {} in {:.03}s", id, start_at.elapsed().as_secs_f64());

        if job.cancel.is_cancelled() {
            log::debug!("discarding result of cancelled request {}", id);
            continue;
        }

        // the caller may have stopped waiting, which is fine
        let _ = job.reply.send(Envelope { id, body });
    }
    log::debug!("solver agent stopped");
}

fn handle_request(solver: &Solver, request: SolverReq) -> SolverResp {
    use SolverReq::*;
    match request {
        Suggest { constraints, options } => match solver.suggest_dto(constraints, &options) {
            Ok(suggestions) => SolverResp::Suggestions(suggestions.into()),
            Err(err) => SolverResp::InvalidConstraints(err),
        },
        DictionaryInfo => SolverResp::DictionaryInfo(DictionaryInfoDto {
            num_words: solver.dictionary().len(),
        }),
        ReloadDictionary => SolverResp::DictionaryInfo(DictionaryInfoDto {
            num_words: solver.reload_dictionary().len(),
        }),
    }
}
