/// リモートドキュメントストアのREST実装
///
/// `BillDocuments`ポートをAPIサーバーの`/api/bills`エンドポイント群で実装します。
/// ライブ購読はポーリングで実現し、取得したドキュメント集合が前回と異なる
/// 場合のみスナップショットを配信します。ポート契約（変化のたびにプッシュ）
/// を満たすため、プッシュ型のトランスポートへの差し替えはこのアダプタの
/// 置き換えだけで済みます。
use super::models::{BillPatch, NewBillDocument, RawBillDocument};
use super::repository::BillDocuments;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// スナップショットチャンネルのバッファサイズ
const SNAPSHOT_CHANNEL_CAPACITY: usize = 4;

/// 請求書一覧レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BillListResponse {
    pub bills: Vec<RawBillDocument>,
}

/// 請求書作成レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBillResponse {
    pub id: String,
}

/// APIサーバー経由の請求書リポジトリ
pub struct ApiBillRepository {
    client: Arc<ApiClient>,
}

impl ApiBillRepository {
    /// 環境変数の設定からリポジトリを作成する
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            client: Arc::new(ApiClient::new()?),
        })
    }

    /// APIクライアントを指定してリポジトリを作成する
    pub fn new_with_client(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// ユーザースコープの一覧取得エンドポイントを組み立てる
    fn list_endpoint(user_id: &str) -> String {
        format!("/api/bills?userId={user_id}")
    }

    /// ドキュメント単位のエンドポイントを組み立てる
    fn document_endpoint(id: &str) -> String {
        format!("/api/bills/{id}")
    }
}

#[async_trait]
impl BillDocuments for ApiBillRepository {
    async fn add(&self, doc: NewBillDocument) -> AppResult<String> {
        let response: CreateBillResponse = self.client.post("/api/bills", &doc).await?;
        debug!("請求書ドキュメントを作成しました: id={}", response.id);
        Ok(response.id)
    }

    async fn update(&self, id: &str, patch: BillPatch) -> AppResult<()> {
        let _: serde_json::Value = self
            .client
            .patch(&Self::document_endpoint(id), &patch)
            .await?;
        debug!("請求書ドキュメントを更新しました: id={id}");
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.client.delete(&Self::document_endpoint(id)).await?;
        debug!("請求書ドキュメントを削除しました: id={id}");
        Ok(())
    }

    async fn subscribe(&self, user_id: &str) -> AppResult<mpsc::Receiver<Vec<RawBillDocument>>> {
        let client = Arc::clone(&self.client);
        let user_id = user_id.to_string();
        let interval = Duration::from_secs(client.config().poll_interval_seconds);
        let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut last_snapshot: Option<Vec<RawBillDocument>> = None;

            loop {
                match client
                    .get::<BillListResponse>(&ApiBillRepository::list_endpoint(&user_id))
                    .await
                {
                    Ok(response) => {
                        let docs = response.bills;
                        // 前回と同一のスナップショットは配信しない
                        if last_snapshot.as_ref() != Some(&docs) {
                            last_snapshot = Some(docs.clone());
                            if tx.send(docs).await.is_err() {
                                debug!(
                                    "購読者が破棄されたためポーリングを終了します: user_id={user_id}"
                                );
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        // 一時的な失敗は次のポーリングで再試行する
                        warn!("請求書一覧の取得に失敗しました: {e}");
                    }
                }

                tokio::time::sleep(interval).await;
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_formatting() {
        assert_eq!(
            ApiBillRepository::list_endpoint("user-1"),
            "/api/bills?userId=user-1"
        );
        assert_eq!(
            ApiBillRepository::document_endpoint("doc-42"),
            "/api/bills/doc-42"
        );
    }

    #[test]
    fn test_list_response_deserialization() {
        let json = serde_json::json!({
            "bills": [
                {
                    "id": "doc-1",
                    "name": "Water",
                    "amount": 450.0,
                    "dueDate": "2026-09-01T00:00:00Z",
                    "userId": "user-1"
                }
            ]
        });

        let response: BillListResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.bills.len(), 1);
        assert_eq!(response.bills[0].name.as_deref(), Some("Water"));
    }
}
