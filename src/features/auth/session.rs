/// 認証セッションポート
///
/// IDプロバイダへの依存をこのトレイトの背後に隔離します。
/// ストアの各操作は、セッションが未ログインの場合は何もせずに戻ります。
pub trait AuthSession: Send + Sync + 'static {
    /// 現在ログイン中のユーザーIDを取得する
    ///
    /// # 戻り値
    /// ユーザーID、未ログインの場合はNone
    fn current_user_id(&self) -> Option<String>;
}

/// 固定ユーザーセッション
///
/// 組み込み側でユーザーIDが確定している場合やテストで使用する、
/// 最小限のセッション実装です。
#[derive(Debug, Clone)]
pub struct FixedSession {
    user_id: Option<String>,
}

impl FixedSession {
    /// ログイン済みセッションを作成する
    pub fn signed_in<S: Into<String>>(user_id: S) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// 未ログインセッションを作成する
    pub fn signed_out() -> Self {
        Self { user_id: None }
    }
}

impl AuthSession for FixedSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
