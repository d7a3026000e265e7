/// 汎用APIクライアント
///
/// 請求書APIサーバーとの通信を行う汎用的なクライアント。
/// リトライ（指数バックオフ）と構造化エラーレスポンスの解析を提供します。
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::AppError;
use log::{debug, info, warn};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIサーバーからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

/// 汎用APIクライアント
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// 環境変数の設定からAPIクライアントを作成
    pub fn new() -> Result<Self, AppError> {
        let config = ApiConfig::from_env()?;
        Self::new_with_config(config)
    }

    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(config: ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// クライアントが使用している設定への参照を取得
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        debug!("GETリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let request = self.client.get(&url);

        self.send_request_with_retry(request, "GET", endpoint).await
    }

    /// POSTリクエストを送信
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let request = self.client.post(&url).json(body);

        self.send_request_with_retry(request, "POST", endpoint)
            .await
    }

    /// PATCHリクエストを送信
    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let request = self.client.patch(&url).json(body);

        self.send_request_with_retry(request, "PATCH", endpoint)
            .await
    }

    /// DELETEリクエストを送信
    ///
    /// DELETEリクエストは通常レスポンスボディがないため、成功ステータスのみチェックします。
    pub async fn delete(&self, endpoint: &str) -> Result<(), AppError> {
        let url = format!("{}{endpoint}", self.config.base_url);
        info!("DELETEリクエスト送信: endpoint={endpoint}");

        let request = self.client.delete(&url);

        let mut attempts = 0;
        loop {
            let cloned_request = request.try_clone().ok_or_else(|| {
                AppError::ExternalService("リクエストのクローンに失敗しました".to_string())
            })?;

            match cloned_request.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        info!("DELETEリクエスト成功: endpoint={endpoint}");
                        return Ok(());
                    } else {
                        let error_response = self.handle_error_response(response).await?;
                        return Err(AppError::ExternalService(format!(
                            "APIサーバーエラー: {} - {}",
                            error_response.error.code, error_response.error.message
                        )));
                    }
                }
                Err(e) => {
                    if attempts < self.config.max_retries {
                        attempts += 1;
                        let delay = Duration::from_secs(2_u64.pow(attempts));
                        warn!(
                            "APIリクエスト失敗、リトライします: attempt={attempts}/{}, delay={delay:?}",
                            self.config.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    } else {
                        return Err(AppError::ExternalService(format!(
                            "APIサーバーへの接続に失敗しました: {e}"
                        )));
                    }
                }
            }
        }
    }

    /// リトライ機能付きでリクエストを送信
    async fn send_request_with_retry<T>(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let mut attempts = 0;
        loop {
            let cloned_request = request.try_clone().ok_or_else(|| {
                AppError::ExternalService("リクエストのクローンに失敗しました".to_string())
            })?;

            match cloned_request.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        let result: T = response.json().await.map_err(|e| {
                            AppError::ExternalService(format!("レスポンス解析エラー: {e}"))
                        })?;

                        debug!("{method}リクエスト成功: endpoint={endpoint}");
                        return Ok(result);
                    } else {
                        let error_response = self.handle_error_response(response).await?;
                        return Err(AppError::ExternalService(format!(
                            "APIサーバーエラー: {} - {}",
                            error_response.error.code, error_response.error.message
                        )));
                    }
                }
                Err(e) => {
                    if attempts < self.config.max_retries {
                        attempts += 1;
                        let delay = Duration::from_secs(2_u64.pow(attempts));
                        warn!(
                            "APIリクエスト失敗、リトライします: attempt={attempts}/{}, delay={delay:?}",
                            self.config.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    } else {
                        return Err(AppError::ExternalService(format!(
                            "APIサーバーへの接続に失敗しました: {e}"
                        )));
                    }
                }
            }
        }
    }

    /// エラーレスポンスを処理し、詳細なエラー情報を提供
    async fn handle_error_response(&self, response: Response) -> Result<ErrorResponse, AppError> {
        let status = response.status();
        let status_code = status.as_u16();

        // レスポンスヘッダーからリクエストIDを取得
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        // JSONエラーレスポンスの解析を試行
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
            debug!(
                "APIサーバーから構造化エラーレスポンスを受信: code={}, message={}",
                error_response.error.code, error_response.error.message
            );
            Ok(error_response)
        } else {
            // JSONでない場合は汎用エラーレスポンスを作成
            let (error_code, user_message) = match status_code {
                400 => ("BAD_REQUEST", "リクエストの形式が正しくありません"),
                401 => (
                    "UNAUTHORIZED",
                    "認証に失敗しました。再度ログインしてください",
                ),
                403 => ("FORBIDDEN", "この操作を実行する権限がありません"),
                404 => ("NOT_FOUND", "指定されたリソースが見つかりません"),
                429 => (
                    "TOO_MANY_REQUESTS",
                    "リクエストが多すぎます。しばらく待ってから再試行してください",
                ),
                500 => ("INTERNAL_SERVER_ERROR", "サーバー内部エラーが発生しました"),
                503 => ("SERVICE_UNAVAILABLE", "APIサーバーが一時的に利用できません"),
                _ => ("UNKNOWN_ERROR", "不明なエラーが発生しました"),
            };

            warn!(
                "APIサーバーから非構造化エラーレスポンス: status={status_code}, body={response_text}"
            );

            Ok(ErrorResponse {
                error: ErrorDetail {
                    code: error_code.to_string(),
                    message: user_message.to_string(),
                    details: Some(serde_json::json!({
                        "http_status": status_code,
                        "raw_response": response_text,
                    })),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    request_id,
                },
            })
        }
    }
}
