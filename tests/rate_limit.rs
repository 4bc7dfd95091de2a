mod common;

use axum::{extract::ConnectInfo, http::StatusCode};
use axum_test::TestServer;
use common::StubTransport;
use std::net::SocketAddr;
use tempus_fugit::routes::build_router;
use tower::Layer;

#[derive(Clone)]
struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

fn rate_limited_server() -> TestServer {
    build_rate_limited_server(false)
}

fn build_rate_limited_server(behind_proxy: bool) -> TestServer {
    let mut options = common::test_options();
    options.login_rate_limit = true;
    options.behind_proxy = behind_proxy;

    let app = build_router(common::create_test_state(StubTransport::authorized()), &options)
        .layer(MockConnectInfoLayer);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_login_page_rate_limited() {
    let server = rate_limited_server();

    server.get("/login.html").await.assert_status_ok();

    let mut limited = false;
    for _ in 0..20 {
        if server.get("/login.html").await.status_code() == StatusCode::TOO_MANY_REQUESTS {
            limited = true;
            break;
        }
    }

    assert!(limited);
}

#[tokio::test]
async fn test_other_pages_not_rate_limited() {
    let server = rate_limited_server();

    for _ in 0..20 {
        server.get("/blog.html").await.assert_status_ok();
    }
}

/// Sends login page requests from `client` until one is refused.
async fn exhaust(server: &TestServer, client: &str) -> bool {
    for _ in 0..20 {
        let response = server
            .get("/login.html")
            .add_header("x-forwarded-for", client)
            .await;
        if response.status_code() == StatusCode::TOO_MANY_REQUESTS {
            return true;
        }
    }
    false
}

#[tokio::test]
async fn test_behind_proxy_limits_per_forwarded_ip() {
    let server = build_rate_limited_server(true);

    assert!(exhaust(&server, "203.0.113.7").await);

    // Same peer socket, different forwarded client.
    server
        .get("/login.html")
        .add_header("x-forwarded-for", "198.51.100.20")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_direct_mode_ignores_forwarded_header() {
    let server = rate_limited_server();

    assert!(exhaust(&server, "203.0.113.7").await);

    // The limit follows the peer address, so a new header does not help.
    server
        .get("/login.html")
        .add_header("x-forwarded-for", "198.51.100.20")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
