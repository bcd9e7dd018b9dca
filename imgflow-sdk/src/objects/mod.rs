pub mod control_net;
pub mod events;
pub mod graph;
pub mod image;
pub mod schedulers;
pub mod session;

pub use control_net::{
    ControlNetResponse, ProcessedImageCommit, PutControlNetRequest, SetControlImageRequest,
};
pub use events::{
    GraphExecutionStateCompleteEvent, InvocationCompleteEvent, InvocationErrorEvent,
    InvocationResult, InvocationStartedEvent, LatentsRef, SocketEvent,
};
pub use graph::{Edge, EdgeConnection, Graph, Node};
pub use image::{ImageDto, ImageRef};
pub use schedulers::{
    SchedulerName, SchedulerOption, SchedulerSettingsResponse, UpdateFavoriteSchedulersRequest,
    scheduler_options,
};
pub use session::{CreateSessionRequest, Session};
