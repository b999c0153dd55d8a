//! The request pipeline: validate, dispatch, normalize.

use crate::client::AngelClient;
use crate::envelope::ProxyResponse;
use crate::error::ProxyError;
use crate::validate::ProxyRequest;

/// Handle one proxy request body end to end.
///
/// Always produces a response. Rejected input never reaches the broker, and
/// every successful dispatch makes exactly one upstream call.
pub async fn handle(client: &AngelClient, body: &[u8]) -> ProxyResponse {
    tracing::debug!(len = body.len(), "proxy request received");

    let request = match ProxyRequest::parse(body) {
        Ok(request) => request,
        Err(err) => {
            log_rejection(&err);
            return ProxyResponse::from(err);
        }
    };
    let action = request.action();
    tracing::info!(%action, "forwarding request");

    match client.dispatch(&request).await {
        Ok(outcome) => {
            let response = ProxyResponse::from_outcome(action, outcome);
            match response.code() {
                Some(code) => tracing::warn!(
                    %action,
                    status = response.http_status().as_u16(),
                    code,
                    "request failed upstream"
                ),
                None => tracing::info!(%action, "request succeeded"),
            }
            response
        }
        Err(err) => {
            log_rejection(&err);
            ProxyResponse::from(err)
        }
    }
}

/// Log an error that ends a request, at `warn` for caller mistakes and
/// `error` for everything else.
pub(crate) fn log_rejection(err: &ProxyError) {
    match err {
        ProxyError::InvalidArgument(_)
        | ProxyError::PayloadTooLarge { .. }
        | ProxyError::UnreadableBody(_)
        | ProxyError::EmptyBody
        | ProxyError::InvalidJson(_)
        | ProxyError::MissingAction
        | ProxyError::UnknownAction(_)
        | ProxyError::MissingFields { .. }
        | ProxyError::InvalidFormat(_) => tracing::warn!(error = %err, "rejected request"),
        _ => tracing::error!(error = %err, "unexpected failure handling request"),
    }
}
