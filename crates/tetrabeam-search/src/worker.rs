use std::{
    io,
    sync::mpsc::{self, RecvTimeoutError, TryRecvError},
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{trace, warn};
use tetrabeam_engine::GameState;

use crate::{
    cancel::CancelToken,
    decision::Decision,
    engine::{Engine, EngineState},
};

#[derive(Debug)]
struct SearchRequest {
    id: u64,
    game: GameState,
    cancel: CancelToken,
}

#[derive(Debug)]
pub struct SearchResponse {
    /// Id returned by the [`SearchWorker::submit`] call this answers.
    pub id: u64,
    pub decision: Decision,
}

/// Runs an [`Engine`] on its own thread.
///
/// Requests are answered in submission order, one response each. Submitting
/// a request cancels the one in flight, which then answers with its best
/// move so far. Dropping the worker cancels the in-flight request and joins
/// the thread.
#[derive(Debug)]
pub struct SearchWorker {
    tx: Option<mpsc::Sender<SearchRequest>>,
    rx: mpsc::Receiver<SearchResponse>,
    in_flight: Option<CancelToken>,
    next_id: u64,
    state: EngineState,
    handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    pub fn spawn(engine: Engine) -> io::Result<Self> {
        let (tx_request, rx_request) = mpsc::channel();
        let (tx_response, rx_response) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("tetrabeam-search".to_owned())
            .spawn(move || search_thread(engine, &rx_request, &tx_response))?;
        Ok(Self {
            tx: Some(tx_request),
            rx: rx_response,
            in_flight: None,
            next_id: 0,
            state: EngineState::Idle,
            handle: Some(handle),
        })
    }

    /// Queues a decision for `game` and returns its request id.
    pub fn submit(&mut self, game: GameState) -> u64 {
        self.cancel();
        let id = self.next_id;
        self.next_id += 1;
        let cancel = CancelToken::new();
        self.in_flight = Some(cancel.clone());
        self.state = EngineState::Thinking;
        if let Some(tx) = &self.tx {
            if tx.send(SearchRequest { id, game, cancel }).is_err() {
                warn!("search worker is gone; request {id} dropped");
            }
        }
        id
    }

    /// Asks the most recently submitted request to finish early.
    pub fn cancel(&self) {
        if let Some(cancel) = &self.in_flight {
            cancel.cancel();
        }
    }

    /// `Thinking` until the response to the latest request is received,
    /// then the state that search ended in.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Blocks until the next response; `None` if the worker thread is gone.
    pub fn recv(&mut self) -> Option<SearchResponse> {
        let response = self.rx.recv().ok()?;
        Some(self.received(response))
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<SearchResponse, RecvTimeoutError> {
        let response = self.rx.recv_timeout(timeout)?;
        Ok(self.received(response))
    }

    pub fn try_recv(&mut self) -> Result<SearchResponse, TryRecvError> {
        let response = self.rx.try_recv()?;
        Ok(self.received(response))
    }

    fn received(&mut self, response: SearchResponse) -> SearchResponse {
        if response.id + 1 == self.next_id {
            self.state = EngineState::after(response.decision.outcome);
        }
        response
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.cancel();
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("search worker panicked");
            }
        }
    }
}

fn search_thread(
    mut engine: Engine,
    rx: &mpsc::Receiver<SearchRequest>,
    tx: &mpsc::Sender<SearchResponse>,
) {
    while let Ok(request) = rx.recv() {
        trace!("search request {}", request.id);
        let decision = engine.decide_with_cancel(&request.game, &request.cancel);
        let response = SearchResponse {
            id: request.id,
            decision,
        };
        if tx.send(response).is_err() {
            return;
        }
    }
}
