//! `x-request-id` handling for the control router.
//!
//! Incoming ids are kept; requests without one get a UUID. The id is then
//! copied onto the response so callers can match it against server logs.

use tower::ServiceBuilder;
use tower::layer::util::{Identity, Stack};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Layer stack that assigns the request id and echoes it on the response.
pub type RequestIdLayers = ServiceBuilder<
    Stack<PropagateRequestIdLayer, Stack<SetRequestIdLayer<MakeRequestUuid>, Identity>>,
>;

/// Build the request id stack.
///
/// Setting runs outermost so propagation always sees an id.
#[must_use]
pub fn request_id_layers() -> RequestIdLayers {
    ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
}
