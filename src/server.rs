//! The order API: four routes over one JSON collection.
//!
//! Matches the contract the frontend and [`crate::remote::RemoteStore`]
//! already speak: GET returns the raw order array, POST appends one order,
//! PUT replaces the full collection, DELETE clears it. Mutations answer
//! `{"success": true, "message": ...}`; a failed write is a 500 with
//! `{"error": ...}`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::file_store::FileStore;
use crate::order::Order;
use crate::store::OrderStore;

/// Build the API router over a file-backed store.
pub fn router(store: FileStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/orders",
            get(list_orders)
                .post(save_order)
                .put(replace_orders)
                .delete(clear_orders),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

fn ack(message: &str) -> Response {
    Json(json!({ "success": true, "message": message })).into_response()
}

fn failure(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

async fn list_orders(State(store): State<FileStore>) -> Json<Vec<Order>> {
    Json(store.list().await)
}

async fn save_order(State(store): State<FileStore>, Json(order): Json<Order>) -> Response {
    match store.append(&order).await {
        Ok(()) => ack("Order saved successfully"),
        Err(e) => {
            error!("saving order failed: {e}");
            failure("Failed to save order")
        }
    }
}

async fn replace_orders(State(store): State<FileStore>, Json(orders): Json<Vec<Order>>) -> Response {
    match store.replace_all(&orders).await {
        Ok(()) => ack("Orders updated successfully"),
        Err(e) => {
            error!("replacing orders failed: {e}");
            failure("Failed to update orders")
        }
    }
}

async fn clear_orders(State(store): State<FileStore>) -> Response {
    match store.clear_all().await {
        Ok(()) => ack("Orders cleared successfully"),
        Err(e) => {
            error!("clearing orders failed: {e}");
            failure("Failed to clear orders")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{CartLine, Customer, OrderType};
    use crate::remote::RemoteStore;
    use crate::status::OrderStatus;
    use chrono::Utc;

    fn order(number: &str) -> Order {
        Order {
            order_number: number.to_string(),
            customer: Customer {
                name: "Noor".into(),
                phone: "555-0142".into(),
                email: None,
            },
            order_type: OrderType::Takeout,
            delivery_address: None,
            order_notes: Some("extra napkins".into()),
            payment_method: "cash".into(),
            items: vec![CartLine {
                name: "Wrap".into(),
                price: 9.0,
                quantity: 1,
            }],
            subtotal: 9.0,
            tax: 0.9,
            total: 9.9,
            timestamp: Utc::now(),
            status: OrderStatus::New,
        }
    }

    /// Boot the router on an ephemeral port and return a client for it.
    async fn spawn() -> (RemoteStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path().join("orders.json")).expect("open");
        let app = router(store);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        let client = RemoteStore::new(&format!("http://{addr}")).expect("client");
        (client, dir)
    }

    #[tokio::test]
    async fn empty_collection_lists_as_empty_array() {
        let (client, _dir) = spawn().await;
        assert!(client.fetch().await.expect("fetch").is_empty());
    }

    #[tokio::test]
    async fn post_appends_without_touching_existing_orders() {
        let (client, _dir) = spawn().await;
        client.append(&order("BOJO-0001")).await.expect("post");
        client.append(&order("BOJO-0002")).await.expect("post");

        let orders = client.fetch().await.expect("fetch");
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_number, "BOJO-0001");
        assert_eq!(orders[1].order_number, "BOJO-0002");
        assert_eq!(orders[0].order_notes.as_deref(), Some("extra napkins"));
    }

    #[tokio::test]
    async fn put_replaces_the_whole_collection() {
        let (client, _dir) = spawn().await;
        client.append(&order("BOJO-0001")).await.expect("post");

        let mut replacement = order("BOJO-0001");
        replacement.status = OrderStatus::Ready;
        client.replace_all(&[replacement]).await.expect("put");

        let orders = client.fetch().await.expect("fetch");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Ready);
    }

    #[tokio::test]
    async fn delete_clears_everything() {
        let (client, _dir) = spawn().await;
        client.append(&order("BOJO-0001")).await.expect("post");
        client.clear_all().await.expect("delete");
        assert!(client.fetch().await.expect("fetch").is_empty());
    }
}
