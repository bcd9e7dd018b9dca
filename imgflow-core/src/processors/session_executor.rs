//! SessionExecutor processor.
//!
//! The SessionExecutor is responsible for:
//! - Receiving `SessionCreateRequested` and answering with `SessionCreated`
//!   or `SessionCreateFailed`, echoing the request id
//! - Receiving `SessionReadyToInvoke` and starting execution, answering
//!   failures with `SessionInvokeFailed`
//!
//! Requests run concurrently; a slow execution service never blocks the bus.

use std::convert::Infallible;
use std::sync::Arc;

use imgflow_sdk::objects::Graph;
use kanau::processor::Processor;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::execution::ExecutionService;
use crate::events::{AppEvent, RequestId};
use crate::store::Store;

/// Session commands this processor handles.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Create { request_id: RequestId, graph: Graph },
    Invoke { session_id: String },
}

impl SessionCommand {
    pub fn from_event(event: &AppEvent) -> Option<Self> {
        match event {
            AppEvent::SessionCreateRequested { request_id, graph } => Some(Self::Create {
                request_id: *request_id,
                graph: graph.clone(),
            }),
            AppEvent::SessionReadyToInvoke { session_id } => Some(Self::Invoke {
                session_id: session_id.clone(),
            }),
            _ => None,
        }
    }
}

pub struct SessionExecutor {
    store: Store,
    service: Arc<dyn ExecutionService>,
}

impl SessionExecutor {
    pub fn new(store: Store, service: Arc<dyn ExecutionService>) -> Self {
        Self { store, service }
    }

    /// Serve session commands until shutdown.
    ///
    /// Requests still in flight at shutdown are aborted.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let this = Arc::new(self);
        let mut events = this.store.subscribe();
        let mut requests: JoinSet<()> = JoinSet::new();

        info!("SessionExecutor started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("SessionExecutor received shutdown signal");
                        break;
                    }
                }

                Some(_) = requests.join_next(), if !requests.is_empty() => {}

                event = events.recv() => {
                    let Some(event) = event else {
                        info!("Event bus closed");
                        break;
                    };
                    if let Some(command) = SessionCommand::from_event(&event) {
                        let this = Arc::clone(&this);
                        requests.spawn(async move {
                            let Ok(reply) = this.process(command).await;
                            this.store.dispatch(reply).await;
                        });
                    }
                }
            }
        }

        requests.shutdown().await;
        info!("SessionExecutor shutdown complete");
    }
}

impl Processor<SessionCommand> for SessionExecutor {
    type Output = AppEvent;
    type Error = Infallible;

    /// Execute one command and build the reply event.
    async fn process(&self, command: SessionCommand) -> Result<AppEvent, Infallible> {
        let reply = match command {
            SessionCommand::Create { request_id, graph } => {
                match self.service.create_session(graph).await {
                    Ok(session) => {
                        debug!(%request_id, session_id = %session.id, "Session created");
                        AppEvent::SessionCreated {
                            request_id,
                            session,
                        }
                    }
                    Err(e) => {
                        warn!(%request_id, error = %e, "Failed to create session");
                        AppEvent::SessionCreateFailed {
                            request_id,
                            error: e.to_string(),
                        }
                    }
                }
            }
            SessionCommand::Invoke { session_id } => {
                match self.service.invoke_session(&session_id).await {
                    Ok(()) => {
                        debug!(%session_id, "Session invoked");
                        AppEvent::SessionInvoked { session_id }
                    }
                    Err(e) => {
                        warn!(%session_id, error = %e, "Failed to invoke session");
                        AppEvent::SessionInvokeFailed {
                            session_id,
                            error: e.to_string(),
                        }
                    }
                }
            }
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::testing::{FakeCall, FakeExecutionService, next_matching};

    fn executor(fake: &Arc<FakeExecutionService>) -> SessionExecutor {
        SessionExecutor::new(Store::new(EventBus::new(16)), fake.clone())
    }

    #[tokio::test]
    async fn test_create_echoes_request_id() {
        let fake = Arc::new(FakeExecutionService::default());
        let request_id = RequestId::new();

        let reply = executor(&fake)
            .process(SessionCommand::Create {
                request_id,
                graph: Graph::default(),
            })
            .await
            .unwrap();

        match reply {
            AppEvent::SessionCreated {
                request_id: answered,
                session,
            } => {
                assert_eq!(answered, request_id);
                assert_eq!(session.id, "session-1");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_service_failures_become_events() {
        let fake = Arc::new(FakeExecutionService::failing());
        let executor = executor(&fake);
        let request_id = RequestId::new();

        let reply = executor
            .process(SessionCommand::Create {
                request_id,
                graph: Graph::default(),
            })
            .await
            .unwrap();
        assert!(matches!(
            reply,
            AppEvent::SessionCreateFailed { request_id: r, .. } if r == request_id
        ));

        let reply = executor
            .process(SessionCommand::Invoke {
                session_id: "ctx-9".into(),
            })
            .await
            .unwrap();
        assert!(matches!(
            reply,
            AppEvent::SessionInvokeFailed { ref session_id, .. } if session_id == "ctx-9"
        ));
    }

    #[tokio::test]
    async fn test_run_answers_commands_on_the_bus() {
        let fake = Arc::new(FakeExecutionService::default());
        let store = Store::new(EventBus::new(16));
        let mut world = store.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(SessionExecutor::new(store.clone(), fake.clone()).run(shutdown_rx));

        while store.bus().subscriber_count() < 2 {
            tokio::task::yield_now().await;
        }
        store
            .dispatch(AppEvent::SessionReadyToInvoke {
                session_id: "ctx-9".into(),
            })
            .await;

        let invoked = next_matching(&mut world, |e| match e {
            AppEvent::SessionInvoked { session_id } => Some(session_id.clone()),
            _ => None,
        })
        .await;
        assert_eq!(invoked, "ctx-9");
        assert_eq!(fake.calls(), vec![FakeCall::InvokeSession("ctx-9".into())]);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
