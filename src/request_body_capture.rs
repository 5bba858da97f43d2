//! Request body capture
//!
//! Reads the declared number of bytes off the inbound payload and puts a
//! replay stream back into the request, so the handler still reads the
//! whole body from its first byte.

use std::pin::Pin;

use actix_web::{
    dev::{Payload, ServiceRequest},
    error::PayloadError,
    web::{Bytes, BytesMut},
    HttpMessage,
};
use futures::stream::{self, Stream, StreamExt};

use crate::utils::{declared_content_length, CapturedBody};

const INITIAL_CAPACITY: usize = 8 * 1024;

/// Captures up to `Content-Length` bytes of the request body
///
/// - No, zero or unparsable `Content-Length`: nothing is read and the payload
///   is left untouched.
/// - Fewer bytes than declared: whatever arrived is captured (short body).
/// - `limit` below the declared length: capture stops at `limit` and the
///   result is marked truncated.
/// - A payload error stops the capture; the handler receives the same error
///   right after the bytes that preceded it.
pub async fn capture_request_body(req: &mut ServiceRequest, limit: Option<usize>) -> CapturedBody {
    let declared = declared_content_length(req.headers());
    if declared == 0 {
        return CapturedBody::default();
    }
    let wanted = limit.map_or(declared, |limit| declared.min(limit));

    let mut payload = req.take_payload();
    // Content-Length is client-controlled; grow as bytes actually arrive
    let mut captured = BytesMut::with_capacity(wanted.min(INITIAL_CAPACITY));
    let mut consumed: Vec<Bytes> = Vec::new();
    let mut failure: Option<PayloadError> = None;

    while captured.len() < wanted {
        match payload.next().await {
            Some(Ok(chunk)) => {
                let take = chunk.len().min(wanted - captured.len());
                captured.extend_from_slice(&chunk[..take]);
                consumed.push(chunk);
            }
            Some(Err(e)) => {
                tracing::debug!(error = %e, read = captured.len(), "request payload failed during capture");
                failure = Some(e);
                break;
            }
            None => break,
        }
    }

    if failure.is_none() && captured.len() < wanted {
        tracing::debug!(declared, read = captured.len(), "request body shorter than declared");
    }

    // Replay what was consumed, then the error (if any), then whatever is left
    let replay = stream::iter(consumed.into_iter().map(Ok::<Bytes, PayloadError>))
        .chain(stream::iter(failure.map(Err)))
        .chain(payload);
    req.set_payload(Payload::Stream {
        payload: Box::pin(replay) as Pin<Box<dyn Stream<Item = Result<Bytes, PayloadError>>>>,
    });

    CapturedBody {
        bytes: captured.freeze(),
        truncated: wanted < declared,
    }
}
