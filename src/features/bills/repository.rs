use super::models::{BillPatch, NewBillDocument, RawBillDocument};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// リモートドキュメントストアのポート
///
/// 請求書ドキュメントコレクションへのアクセスをこのトレイトの背後に隔離します。
/// コレクションは所有ユーザーIDの等価条件で問い合わせ可能で、ライブ購読
/// （マッチするドキュメントの作成・更新・削除のたびにスナップショットを
/// プッシュする）をサポートします。
#[async_trait]
pub trait BillDocuments: Send + Sync + 'static {
    /// 請求書ドキュメントを作成する
    ///
    /// # 引数
    /// * `doc` - 作成するドキュメント
    ///
    /// # 戻り値
    /// サーバー採番のドキュメントID、または失敗時はエラー
    async fn add(&self, doc: NewBillDocument) -> AppResult<String>;

    /// 請求書ドキュメントを部分更新する
    ///
    /// パッチに含まれるフィールドのみが書き換えられ、それ以外の
    /// フィールドはリモート側の値が維持されます。
    ///
    /// # 引数
    /// * `id` - ドキュメントID
    /// * `patch` - 部分更新パッチ
    async fn update(&self, id: &str, patch: BillPatch) -> AppResult<()>;

    /// 請求書ドキュメントを削除する
    ///
    /// # 引数
    /// * `id` - ドキュメントID
    async fn delete(&self, id: &str) -> AppResult<()>;

    /// 指定ユーザーのドキュメントのライブ購読を開始する
    ///
    /// 購読開始直後に現在のスナップショットが1回配信され、以降は
    /// マッチするドキュメント集合が変化するたびに新しいスナップショット
    /// （マッチする全ドキュメント）が配信されます。
    ///
    /// # 引数
    /// * `user_id` - 所有ユーザーID
    ///
    /// # 戻り値
    /// スナップショットの受信チャンネル、または失敗時はエラー
    async fn subscribe(&self, user_id: &str) -> AppResult<mpsc::Receiver<Vec<RawBillDocument>>>;
}
