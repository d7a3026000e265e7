/// 通知機能モジュール
///
/// このモジュールは、リマインダーの通知に関連するすべての機能を提供します：
/// - 期日通知のスケジュール（期日の12時間前に発火）
/// - 追加確認通知の即時表示
/// - 通知チャンネルの登録（冪等）
/// - 期日通知のキャンセル
pub mod models;
pub mod service;

// 公開インターフェース
pub use models::{
    ChannelImportance, ChannelSpec, NotificationPayload, BILL_REMINDER_CHANNEL,
    CONFIRMATION_CHANNEL,
};
pub use service::{AlarmPort, NotificationScheduler, DUE_LEAD_TIME_HOURS};
