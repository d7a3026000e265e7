/// 共有モジュール
///
/// 機能モジュール間で共有される横断的なコード（エラー型、設定、APIクライアント）
/// を提供します。
pub mod api_client;
pub mod config;
pub mod errors;
