//! End-to-end tests driving a served application over real HTTP.

use std::time::Duration;

use cascade_core::{App, AppError, Flow};
use cascade_server::{listen, ServerHandle};
use http::StatusCode;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

async fn serve(app: App) -> ServerHandle {
    init_tracing();
    listen(app, "127.0.0.1:0").await.expect("listen failed")
}

async fn stop(handle: ServerHandle) {
    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(5), handle.stopped())
        .await
        .expect("server did not stop");
}

#[tokio::test]
async fn empty_app_responds_404() {
    let handle = serve(App::new()).await;

    let url = format!("http://{}/foo", handle.local_addr());
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    stop(handle).await;
}

#[tokio::test]
async fn handler_body_and_status_reach_the_client() {
    let mut app = App::new();
    app.use_fn(|_req, res| {
        res.send("hello");
        Ok(Flow::Halt)
    });

    let handle = serve(app).await;

    let url = format!("http://{}/", handle.local_addr());
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "hello");

    stop(handle).await;
}

#[tokio::test]
async fn exhausted_chain_responds_404_over_http() {
    let mut app = App::new();
    app.use_fn(|_req, _res| Ok(Flow::Next))
        .use_fn(|_req, _res| Ok(Flow::Next));

    let handle = serve(app).await;

    let url = format!("http://{}/", handle.local_addr());
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    stop(handle).await;
}

#[tokio::test]
async fn unhandled_error_responds_500_over_http() {
    let mut app = App::new();
    app.use_fn(|_req, _res| Err(AppError::new("exploded")));

    let handle = serve(app).await;

    let url = format!("http://{}/", handle.local_addr());
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    stop(handle).await;
}

#[tokio::test]
async fn mounted_subapp_error_is_handled_by_parent() {
    let mut sub = App::new();
    sub.use_fn(|_req, _res| Ok(Flow::Fail(AppError::new("m1 error"))));

    let mut app = App::new();
    app.mount(sub).use_error_fn(|err, _req, res| {
        res.send(err.message());
        Ok(Flow::Halt)
    });

    let handle = serve(app).await;

    let url = format!("http://{}/", handle.local_addr());
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "m1 error");

    stop(handle).await;
}

#[tokio::test]
async fn listen_serves_multiple_sequential_requests() {
    let mut app = App::new();
    app.use_fn(|req, res| {
        res.send(req.uri().path());
        Ok(Flow::Halt)
    });

    let handle = serve(app).await;

    for path in ["/first", "/second", "/third"] {
        let url = format!("http://{}{path}", handle.local_addr());
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.text().await.unwrap(), path);
    }

    stop(handle).await;
}
