mod classifier;
mod machine;
mod request;
mod types;

pub use classifier::{Transition, classify};
pub use machine::FlowState;
pub use request::{
    DaVinciRequest, EventType, RequestData, RequestParameters, build_action_request,
    build_submit_request,
};
pub use types::{
    Authorization, CacheInfo, ClientInfo, CollectorErrorDetail, ContinueNode, DaVinciError,
    ErrorCode, ErrorNode, ErrorStatus, ErrorType, FailureNode, Link, Node, NodeStatus, ServerInfo,
    SuccessNode, SuccessServer,
};
