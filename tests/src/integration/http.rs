//! # HTTP Flows
//!
//! Two routers over two replicas over one store: a proposal accepted by one
//! endpoint is readable through the other once its block seals.

#[cfg(test)]
mod tests {
    use super::super::fixtures::Cluster;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
        Router,
    };
    use http_body_util::BodyExt;
    use ledger_types::{Block, TxPosition};
    use tl_06_api_gateway::build_router;
    use tower::ServiceExt;

    async fn call(router: &Router, method: &str, uri: &str, body: String) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        router.clone().oneshot(request).await.unwrap()
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_propose_on_one_endpoint_read_on_other() {
        let cluster = Cluster::new(3);
        let left = build_router(cluster.replica());
        let right = build_router(cluster.replica());

        let mut positions = Vec::new();
        for i in 0..6 {
            let router = if i % 2 == 0 { &left } else { &right };
            let body = serde_json::json!({ "content": format!("h-{}", i) }).to_string();
            let response = call(router, "POST", "/proposeTransaction", body).await;
            assert_eq!(response.status(), StatusCode::ACCEPTED);
            positions.push(json::<TxPosition>(response).await);
        }
        assert_eq!(positions[5], TxPosition { block_num: 1, tx_number: 2 });

        let response = call(&right, "GET", "/getBlock", r#"{"blockNum":0}"#.into()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let b0: Block = json(response).await;

        let response = call(&left, "GET", "/getBlock", r#"{"blockNum":1}"#.into()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let b1: Block = json(response).await;
        assert_eq!(b1.previous_hash(), b0.hash());

        let response = call(&left, "GET", "/getBlock", r#"{"blockNum":2}"#.into()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_corruption_surfaces_as_server_error_on_fresh_replica() {
        let cluster = Cluster::new(25);
        let writer = build_router(cluster.replica());
        for i in 0..25 {
            let body = serde_json::json!({ "content": format!("tx-{}", i) }).to_string();
            call(&writer, "POST", "/proposeTransaction", body).await;
        }
        cluster.corrupt(5, b"not a transaction".to_vec());

        let reader = build_router(cluster.replica());
        let response = call(&reader, "GET", "/getBlock", r#"{"blockNum":0}"#.into()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = call(
            &reader,
            "GET",
            "/getTransaction",
            r#"{"blockNum":0,"txNumber":5}"#.into(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
