// floor-client/src/client/remote.rs
// HTTP 客户端 - 网络通信

use super::{FloorBackend, Operation, validate_order_request};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use shared::{
    ApiErrorBody, DiningTable, FreeTable, ItemId, MenuItem, OccupyTableRequest, Order, OrderCreate,
};

/// Network implementation of [`FloorBackend`]
#[derive(Debug, Clone)]
pub struct RemoteStateClient {
    client: Client,
    base_url: Url,
}

impl RemoteStateClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            ClientError::validation(format!("Invalid backend URL {:?}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::validation(format!(
                "Invalid backend URL {:?}",
                config.base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            tracing::error!(error = %e, "Failed to build HTTP client");
            ClientError::network(None, "Failed to build HTTP client")
        })?;

        Ok(Self { client, base_url })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, op: Operation, request: RequestBuilder) -> ClientResult<reqwest::Response> {
        tracing::debug!(operation = %op, "Sending request");
        let response = request.send().await.map_err(|e| {
            tracing::error!(operation = %op, error = %e, "Request failed");
            let message = if e.is_timeout() {
                format!("{} (request timed out)", op.fallback_message())
            } else {
                op.fallback_message().to_string()
            };
            ClientError::network(None, message)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        // 尝试解析为 API 错误响应
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.message())
            .unwrap_or_else(|| op.fallback_message().to_string());
        tracing::warn!(
            operation = %op,
            status = status.as_u16(),
            message = %message,
            "Backend rejected request"
        );
        Err(ClientError::network(Some(status.as_u16()), message))
    }

    async fn fetch<T: DeserializeOwned>(&self, op: Operation, request: RequestBuilder) -> ClientResult<T> {
        let response = self.send(op, request).await?;
        let status = response.status();
        response.json::<T>().await.map_err(|e| {
            tracing::error!(operation = %op, error = %e, "Invalid response body");
            ClientError::network(Some(status.as_u16()), op.fallback_message())
        })
    }
}

/// `detail` the backend sends with the 404 for an empty order book
const NO_ORDERS_DETAIL: &str = "No orders found";

fn is_empty_order_book(err: &ClientError) -> bool {
    matches!(
        err,
        ClientError::Network { status: Some(status), message }
            if *status == StatusCode::NOT_FOUND.as_u16() && message == NO_ORDERS_DETAIL
    )
}

#[async_trait]
impl FloorBackend for RemoteStateClient {
    async fn list_menu(&self) -> ClientResult<Vec<MenuItem>> {
        let url = self.endpoint(&["menu"]);
        self.fetch(Operation::ListMenu, self.client.get(url)).await
    }

    async fn list_tables(&self) -> ClientResult<Vec<DiningTable>> {
        let url = self.endpoint(&["tables"]);
        self.fetch(Operation::ListTables, self.client.get(url)).await
    }

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let url = self.endpoint(&["orders"]);
        match self.fetch::<Vec<Order>>(Operation::ListOrders, self.client.get(url)).await {
            // The backend answers an empty order book with this exact 404
            Err(err) if is_empty_order_book(&err) => {
                tracing::debug!("No orders on the backend");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn occupy(&self, table_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["tables", "occupy"]);
        let body = OccupyTableRequest {
            table_id: table_id.to_string(),
        };
        self.send(Operation::Occupy, self.client.post(url).json(&body))
            .await?;
        tracing::info!(table_id = %table_id, "Table occupied");
        Ok(())
    }

    async fn vacate(&self, table_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["tables", table_id, "leave"]);
        self.send(Operation::Vacate, self.client.put(url)).await?;
        tracing::info!(table_id = %table_id, "Table vacated");
        Ok(())
    }

    async fn create_order(&self, table_id: &str, item_ids: &[ItemId]) -> ClientResult<Order> {
        validate_order_request(table_id, item_ids)?;

        let url = self.endpoint(&["orders"]);
        let body = OrderCreate {
            table_id: table_id.to_string(),
            items: item_ids.to_vec(),
        };
        let order: Order = self
            .fetch(Operation::CreateOrder, self.client.post(url).json(&body))
            .await?;
        tracing::info!(order_id = %order.id, table_id = %table_id, items = item_ids.len(), "Order created");
        Ok(order)
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        let url = self.endpoint(&["orders", order_id]);
        self.fetch(Operation::GetOrder, self.client.get(url)).await
    }

    async fn mark_order_ready(&self, order_id: &str) -> ClientResult<Order> {
        let url = self.endpoint(&["orders", order_id, "ready"]);
        let order: Order = self
            .fetch(Operation::MarkOrderReady, self.client.put(url))
            .await?;
        tracing::info!(order_id = %order.id, table_id = %order.table_id, "Order marked ready");
        Ok(order)
    }

    async fn list_free_tables(&self) -> ClientResult<Vec<FreeTable>> {
        let url = self.endpoint(&["free-tables"]);
        self.fetch(Operation::ListFreeTables, self.client.get(url)).await
    }
}
