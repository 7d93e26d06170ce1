//! Throwaway loopback servers standing in for upstream APIs in tests.

use axum::Router;

/// Serves `router` on an ephemeral loopback port and returns `http://host:port`.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake upstream");
    });
    format!("http://{addr}")
}
