//! Response body capture
//!
//! Buffers the handler's response body in memory, then rebuilds the response
//! around the very same bytes. Status, headers and extensions are carried
//! over unchanged. This adds latency equal to response generation time.

use actix_web::{
    body::{self, BodySize, BoxBody, MessageBody},
    dev::ServiceResponse,
    error::ErrorInternalServerError,
    web::Bytes,
    Error,
};

/// Buffers the whole response body
///
/// Returns the rebuilt response together with the buffered bytes. When the
/// body stream fails midway nothing is delivered: the partial buffer is
/// dropped and the error goes to the host like any other handler error.
///
/// A body that reports [`BodySize::None`] (304, HEAD-style replies) is
/// rebuilt as such, so the host does not add `content-length: 0` to it.
pub async fn capture_response_body<B>(
    res: ServiceResponse<B>,
) -> Result<(ServiceResponse<BoxBody>, Bytes), Error>
where
    B: MessageBody + 'static,
{
    let (req, res) = res.into_parts();
    let (head, body) = res.into_parts();

    if body.size() == BodySize::None {
        let res = head.set_body(BoxBody::new(body::None::new()));
        return Ok((ServiceResponse::new(req, res), Bytes::new()));
    }

    let bytes = body::to_bytes(body).await.map_err(|e| {
        let cause: Box<dyn std::error::Error> = e.into();
        tracing::debug!(error = %cause, "response body failed while buffering");
        ErrorInternalServerError(cause)
    })?;

    let res = head.set_body(BoxBody::new(bytes.clone()));
    Ok((ServiceResponse::new(req, res), bytes))
}
