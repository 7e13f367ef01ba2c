//! Sending a `GET` request and collecting the whole response body.

use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use futures_util::ready;
use http::header::{HeaderValue, ACCEPT};
use http::{Request, Response, StatusCode};
use http_body::Body;
use pin_project_lite::pin_project;
use tower_service::Service;

use crate::error::Error;

pin_project! {
    /// A future which resolves to the status and the full body of a response.
    pub struct Collect<F, B> {
        #[pin]
        response: Option<F>,
        #[pin]
        body: Option<B>,
        invalid: Option<http::Error>,
        status: StatusCode,
        buf: Vec<u8>,
    }
}

/// Issues a `GET` request for `uri` through `client`.
///
/// This will call `<S as Service>::call` without checking for `<S as Service>::poll_ready`.
pub fn get<S, ReqB, ResB>(client: &mut S, uri: String) -> Collect<S::Future, ResB>
where
    S: Service<Request<ReqB>, Response = Response<ResB>>,
    ReqB: Default,
{
    let req = Request::get(uri)
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .body(ReqB::default());
    let (response, invalid) = match req {
        Ok(req) => (Some(client.call(req)), None),
        Err(e) => (None, Some(e)),
    };
    Collect {
        response,
        body: None,
        invalid,
        status: StatusCode::OK,
        buf: Vec::new(),
    }
}

impl<F, B, E> Future for Collect<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: Body<Error = E>,
{
    type Output = Result<(StatusCode, Bytes), Error<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        if let Some(e) = this.invalid.take() {
            return Poll::Ready(Err(Error::InvalidRequest(e)));
        }

        loop {
            if let Some(mut body) = this.body.as_mut().as_pin_mut() {
                while let Some(data) = ready!(body.as_mut().poll_data(cx)) {
                    let mut data = data.map_err(Error::Service)?;
                    while data.has_remaining() {
                        let chunk = data.chunk();
                        let n = chunk.len();
                        this.buf.extend_from_slice(chunk);
                        data.advance(n);
                    }
                }
                let body = Bytes::from(mem::take(this.buf));
                return Poll::Ready(Ok((*this.status, body)));
            }

            let response = match this.response.as_mut().as_pin_mut() {
                Some(response) => response,
                None => panic!("`Collect` polled after completion"),
            };
            let res = ready!(response.poll(cx)).map_err(Error::Service)?;
            let (parts, body) = res.into_parts();
            *this.status = parts.status;
            this.response.set(None);
            this.body.set(Some(body));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use futures::executor::block_on;
    use tower::service_fn;

    use super::*;

    #[test]
    fn collects_body() {
        let mut client = service_fn(|req: Request<String>| async move {
            assert_eq!(req.method(), http::Method::GET);
            assert_eq!(req.uri(), "https://example.com/x?a=1");
            Ok::<_, Infallible>(
                Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(String::from("{}"))
                    .unwrap(),
            )
        });
        let (status, body) =
            block_on(get(&mut client, "https://example.com/x?a=1".into())).unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(&body[..], b"{}");
    }

    #[test]
    fn invalid_uri() {
        let mut client = service_fn(|_: Request<String>| async move {
            Ok::<_, Infallible>(Response::new(String::new()))
        });
        match block_on(get(&mut client, "not a uri".into())) {
            Err(Error::InvalidRequest(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
