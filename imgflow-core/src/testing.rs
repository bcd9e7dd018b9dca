//! Test helpers shared by the processor tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use imgflow_sdk::objects::{
    Graph, ImageDto, ImageRef, InvocationCompleteEvent, InvocationResult, Node, Session,
    SocketEvent,
};
use tokio::sync::watch;

use crate::events::{AppEvent, EventBus, Subscription};
use crate::processors::{ExecutionService, ServiceError};
use crate::store::Store;

pub fn canny_node(id: &str) -> Node {
    Node::new(id, "canny_image_processor")
        .with_param("low_threshold", 100)
        .with_param("high_threshold", 200)
}

/// A store holding one control net with the given source image.
pub async fn store_with_control_net(control_net_id: &str, image: Option<&str>) -> Store {
    let store = Store::new(EventBus::new(64));
    store
        .dispatch(AppEvent::ControlNetAdded {
            control_net_id: control_net_id.into(),
            processor_node: canny_node("canny-1"),
            control_image: image.map(|n| ImageDto::new(n, 512, 512)),
        })
        .await;
    store
}

pub fn image_complete(session_id: &str, image_name: &str) -> AppEvent {
    AppEvent::Socket(SocketEvent::InvocationComplete(InvocationCompleteEvent {
        graph_execution_state_id: session_id.into(),
        source_node_id: "canny-1".into(),
        result: InvocationResult::ImageOutput {
            image: ImageRef::new(image_name),
            width: 512,
            height: 512,
        },
    }))
}

pub fn metadata_received(image_name: &str, width: u32, height: u32) -> AppEvent {
    AppEvent::ImageMetadataReceived {
        image: ImageDto::new(image_name, width, height),
    }
}

/// Wait (at most 5s) for the first event `select` accepts.
pub async fn next_matching<T>(
    sub: &mut Subscription,
    select: impl FnMut(&AppEvent) -> Option<T>,
) -> T {
    let (_cancel_tx, mut cancel) = watch::channel(false);
    sub.take(select, Some(Duration::from_secs(5)), &mut cancel)
        .await
        .expect("no matching event")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    CreateSession(usize),
    InvokeSession(String),
    GetImageMetadata(String),
}

/// In-memory execution service.
///
/// Sessions are numbered `session-1`, `session-2`, ...; every image reports
/// 512x512. A failing fake rejects every call.
#[derive(Default)]
pub struct FakeExecutionService {
    fail: bool,
    calls: Mutex<Vec<FakeCall>>,
}

impl FakeExecutionService {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: FakeCall) -> Result<usize, ServiceError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        if self.fail {
            return Err(ServiceError::Unavailable("fake is failing".into()));
        }
        Ok(calls.len())
    }
}

#[async_trait]
impl ExecutionService for FakeExecutionService {
    async fn create_session(&self, graph: Graph) -> Result<Session, ServiceError> {
        let created = self
            .calls()
            .iter()
            .filter(|c| matches!(c, FakeCall::CreateSession(_)))
            .count()
            + 1;
        self.record(FakeCall::CreateSession(graph.nodes.len()))?;
        Ok(Session {
            id: format!("session-{created}"),
            graph,
        })
    }

    async fn invoke_session(&self, session_id: &str) -> Result<(), ServiceError> {
        self.record(FakeCall::InvokeSession(session_id.into()))?;
        Ok(())
    }

    async fn get_image_metadata(&self, image_name: &str) -> Result<ImageDto, ServiceError> {
        self.record(FakeCall::GetImageMetadata(image_name.into()))?;
        Ok(ImageDto::new(image_name, 512, 512))
    }
}
