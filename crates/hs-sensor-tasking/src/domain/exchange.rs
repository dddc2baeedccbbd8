//! Request/response exchange model
//!
//! An [`Exchange`] names one request type, its reply type, and how the host
//! synthesizes a reply locally. The orchestration state machine is written
//! once against this trait and used for both taskings and pre-checks.

use shared_bus::HostMessage;
use shared_types::{
    StatusCode, TaskingPreCheckRequest, TaskingPreCheckResponse, TaskingRequest,
    TaskingResponse, Tracked,
};
use std::fmt;

/// A request type paired with its reply type.
pub trait Exchange: Send + Sync + 'static {
    type Request: Tracked + Clone + fmt::Debug + Send + Sync + Into<HostMessage> + 'static;
    type Response: Tracked + Clone + fmt::Debug + Send + Sync + Into<HostMessage> + 'static;

    /// Request type name, for logs.
    const REQUEST_NAME: &'static str;

    /// Build a reply to `request` locally.
    fn synthesize(request: &Self::Request, status: StatusCode, message: String) -> Self::Response;

    /// Status carried by a reply.
    fn status(response: &Self::Response) -> StatusCode;
}

/// Sensor tasking.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tasking;

impl Exchange for Tasking {
    type Request = TaskingRequest;
    type Response = TaskingResponse;

    const REQUEST_NAME: &'static str = "TaskingRequest";

    fn synthesize(request: &TaskingRequest, status: StatusCode, message: String) -> TaskingResponse {
        TaskingResponse::answering(request, status, message)
    }

    fn status(response: &TaskingResponse) -> StatusCode {
        response.response_header.status
    }
}

/// Sensor tasking pre-check.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskingPreCheck;

impl Exchange for TaskingPreCheck {
    type Request = TaskingPreCheckRequest;
    type Response = TaskingPreCheckResponse;

    const REQUEST_NAME: &'static str = "TaskingPreCheckRequest";

    fn synthesize(
        request: &TaskingPreCheckRequest,
        status: StatusCode,
        message: String,
    ) -> TaskingPreCheckResponse {
        TaskingPreCheckResponse::answering(request, status, message)
    }

    fn status(response: &TaskingPreCheckResponse) -> StatusCode {
        response.response_header.status
    }
}

/// How the working response of an orchestration came to be.
#[derive(Debug, Clone, PartialEq)]
pub enum DownstreamOutcome<R> {
    /// The downstream platform replied in time.
    Downstream(R),
    /// Routing is disabled by configuration.
    Rejected,
    /// Another orchestration already awaits a reply for this tracking id.
    Duplicate,
    /// No matching reply arrived within the wait bound.
    Timeout,
    /// The request could not be handed to the transport.
    Undeliverable(String),
}

impl<R> DownstreamOutcome<R> {
    /// Resolve into the working response for `request`.
    pub fn into_response<E>(self, request: &E::Request, downstream_app_id: &str) -> R
    where
        E: Exchange<Response = R>,
    {
        match self {
            Self::Downstream(response) => response,
            Self::Rejected => E::synthesize(
                request,
                StatusCode::Rejected,
                format!(
                    "Routing to '{downstream_app_id}' has been disabled by config. \
                     (enable_downstream_routing = false)"
                ),
            ),
            Self::Duplicate => E::synthesize(
                request,
                StatusCode::Rejected,
                format!(
                    "A {} with tracking id '{}' is already in flight.",
                    E::REQUEST_NAME,
                    request.tracking_id()
                ),
            ),
            Self::Timeout => E::synthesize(
                request,
                StatusCode::Timeout,
                format!("Timed out waiting for a response from '{downstream_app_id}'."),
            ),
            Self::Undeliverable(reason) => E::synthesize(
                request,
                StatusCode::ServiceUnavailable,
                format!("Unable to deliver request to '{downstream_app_id}': {reason}"),
            ),
        }
    }
}

/// Stage of an orchestration at which a plugin may veto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestrationState {
    /// The request pipeline ran; nothing was routed downstream.
    PreProcessed,
    /// The response pipeline ran; no reply was sent to the source app.
    PostProcessed,
}

/// Terminal result of one orchestration.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition<R> {
    /// No inbound request; nothing happened.
    Ignored,
    /// A plugin vetoed the exchange. Nothing was replied.
    Dropped {
        /// Last state reached before the veto.
        after: OrchestrationState,
    },
    /// The reply was produced and handed to the transport.
    Finalized {
        /// The reply sent to the requester.
        response: R,
    },
}

impl<R> Disposition<R> {
    /// The reply, if one was sent.
    pub fn response(&self) -> Option<&R> {
        match self {
            Self::Finalized { response } => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped { .. })
    }
}
