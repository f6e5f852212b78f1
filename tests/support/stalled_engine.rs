// ABOUTME: Engine that sends response headers and then goes silent.
// ABOUTME: Used to check that request deadlines cover bodies and pull streams.

use super::fake_engine::HOST;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Frame, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use redis_engine::config::EndpointTemplate;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Every answer starts normally and never finishes.
pub struct StalledEngine {
    addr: SocketAddr,
}

impl StalledEngine {
    pub async fn start() -> Self {
        let listener = TcpListener::bind((HOST, 0))
            .await
            .expect("bind stalled engine");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let service = service_fn(|req: Request<Incoming>| async move {
                        Ok::<_, Infallible>(stalled_response(&req))
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr }
    }

    pub fn endpoint(&self) -> EndpointTemplate {
        EndpointTemplate::parse(&format!("http://{{host}}:{}", self.addr.port())).unwrap()
    }
}

/// Body that yields `first` and then waits forever.
fn stalled_body(first: &'static [u8]) -> BoxBody<Bytes, Infallible> {
    let head = stream::iter([Ok::<_, Infallible>(Frame::data(Bytes::from_static(first)))]);
    BodyExt::boxed(StreamBody::new(head.chain(stream::pending())))
}

fn stalled_response(req: &Request<Incoming>) -> Response<BoxBody<Bytes, Infallible>> {
    let builder = Response::builder()
        .status(200)
        .header("Content-Type", "application/json");

    if req.uri().path().ends_with("/images/create") {
        // One progress item, then silence mid-pull.
        builder
            .body(stalled_body(b"{\"status\":\"Pulling from library/redis\"}\r\n"))
            .expect("valid response")
    } else {
        // Promises far more body than it ever sends.
        builder
            .header("Content-Length", "500")
            .body(stalled_body(b"{\"ID\""))
            .expect("valid response")
    }
}
