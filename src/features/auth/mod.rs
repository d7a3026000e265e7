/// 認証機能モジュール
///
/// 認証本体は外部のIDプロバイダに委譲されるため、このモジュールが提供するのは
/// 「現在のユーザーIDを取得する」ための最小限のセッションポートのみです。
pub mod session;

pub use session::{AuthSession, FixedSession};
