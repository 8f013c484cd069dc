use crate::middleware::rate_limit::request_client_ip;
use axum::{extract::Request, middleware::Next, response::Response};

/// One `info` event per successful request. Failures are reported where they are produced.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let url = req.uri().to_string();
    let remote_addr = request_client_ip(&req);

    let response = next.run(req).await;

    let status = response.status();
    if status.as_u16() < 400 {
        tracing::info!(
            status_code = status.as_u16(),
            method = %method,
            url = %url,
            remote_addr = %remote_addr,
            "request"
        );
    }
    response
}
