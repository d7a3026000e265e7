use super::models::{
    ChannelSpec, NotificationPayload, BILL_REMINDER_CHANNEL, CONFIRMATION_CHANNEL,
};
use crate::shared::errors::AppResult;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Once};

/// 期日通知のリード時間（期日の何時間前に発火するか）
pub const DUE_LEAD_TIME_HOURS: i64 = 12;

/// プラットフォームのアラーム・通知ポート
///
/// ホストプラットフォームのアラーム登録と通知表示をこのトレイトの背後に
/// 隔離します。スケジューリングの失敗（権限不足など）はプラットフォーム側で
/// 検出できないことがあり、その場合は通知が発火しないまま静かに劣化します。
pub trait AlarmPort: Send + Sync + 'static {
    /// 通知チャンネルを登録する
    ///
    /// 既存のチャンネルを再登録した場合は何も起こりません（冪等）。
    fn register_channel(&self, channel: &ChannelSpec) -> AppResult<()>;

    /// 絶対時刻のワンショット起床を登録する
    ///
    /// 同じキーで既存の起床がある場合は置き換えます（重複しない）。
    /// 過去の時刻を指定した場合は即時発火します。
    ///
    /// # 引数
    /// * `key` - 起床の識別キー
    /// * `trigger_at` - 発火時刻
    /// * `payload` - 発火時に表示する通知ペイロード
    fn schedule(
        &self,
        key: u32,
        trigger_at: DateTime<Utc>,
        payload: NotificationPayload,
    ) -> AppResult<()>;

    /// 通知を即時表示する
    ///
    /// # 引数
    /// * `notification_id` - 通知ID（同じIDは上書きされる）
    /// * `payload` - 通知ペイロード
    fn post_now(&self, notification_id: u32, payload: NotificationPayload) -> AppResult<()>;

    /// 登録済みの起床をキャンセルする
    ///
    /// 該当するキーの起床が存在しない場合は何も起こりません。
    fn cancel(&self, key: u32) -> AppResult<()>;
}

/// 通知スケジューラ
///
/// リマインダーを将来のプラットフォーム起床と即時の確認通知に変換します。
/// すべての操作はベストエフォートであり、ポートのエラーはログに記録した上で
/// 握りつぶします（このサブシステムに致命的なエラーパスはありません）。
pub struct NotificationScheduler<A: AlarmPort> {
    alarms: Arc<A>,
    channels_registered: Once,
}

impl<A: AlarmPort> NotificationScheduler<A> {
    /// 新しいスケジューラを作成する
    pub fn new(alarms: Arc<A>) -> Self {
        Self {
            alarms,
            channels_registered: Once::new(),
        }
    }

    /// 請求書IDから決定的な起床キーを導出する
    ///
    /// 同じ請求書IDは常に同じキーになるため、同一リマインダーの再スケジュールは
    /// 既存の起床を置き換え、重複しません。
    pub fn wakeup_key(bill_id: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        bill_id.hash(&mut hasher);
        hasher.finish() as u32
    }

    /// 期日通知をスケジュールする
    ///
    /// 発火時刻は期日の12時間前です。発火時刻がすでに過去の場合は
    /// そのまま登録し、プラットフォームの即時発火に委ねます。
    ///
    /// # 引数
    /// * `bill_id` - 請求書ID
    /// * `title` - 通知タイトル
    /// * `message` - 通知本文
    /// * `due_date` - 支払期日
    pub fn schedule_due(&self, bill_id: &str, title: &str, message: &str, due_date: DateTime<Utc>) {
        self.ensure_channels();

        let trigger_at = due_date - Duration::hours(DUE_LEAD_TIME_HOURS);
        let key = Self::wakeup_key(bill_id);
        let payload = NotificationPayload::new(&BILL_REMINDER_CHANNEL, title, message);

        if let Err(e) = self.alarms.schedule(key, trigger_at, payload) {
            warn!("期日通知のスケジュールに失敗しました: bill_id={bill_id}, error={e}");
        } else {
            debug!("期日通知をスケジュールしました: bill_id={bill_id}, trigger_at={trigger_at}");
        }
    }

    /// リマインダー追加の確認通知を即時表示する
    ///
    /// 通知IDはランダムに採番されるため、連続した追加操作の確認通知は
    /// 互いに上書きされず、個別に消去できます。
    ///
    /// # 引数
    /// * `bill_name` - 請求書名
    pub fn show_confirmation(&self, bill_name: &str) {
        self.ensure_channels();

        let notification_id: u32 = rand::random();
        let payload = NotificationPayload::new(
            &CONFIRMATION_CHANNEL,
            "Reminder Scheduled",
            format!("Your bill \"{bill_name}\" reminder has been added."),
        );

        if let Err(e) = self.alarms.post_now(notification_id, payload) {
            warn!("確認通知の表示に失敗しました: error={e}");
        }
    }

    /// 請求書の期日通知をキャンセルする
    ///
    /// # 引数
    /// * `bill_id` - 請求書ID
    pub fn cancel_due(&self, bill_id: &str) {
        let key = Self::wakeup_key(bill_id);
        if let Err(e) = self.alarms.cancel(key) {
            warn!("期日通知のキャンセルに失敗しました: bill_id={bill_id}, error={e}");
        } else {
            debug!("期日通知をキャンセルしました: bill_id={bill_id}");
        }
    }

    /// 通知チャンネルを一度だけ登録する
    ///
    /// ポート側の登録も冪等ですが、毎回の呼び出しを避けるため
    /// スケジューラ側でも一度だけ実行します。
    fn ensure_channels(&self) {
        self.channels_registered.call_once(|| {
            for channel in [&BILL_REMINDER_CHANNEL, &CONFIRMATION_CHANNEL] {
                if let Err(e) = self.alarms.register_channel(channel) {
                    warn!("通知チャンネルの登録に失敗しました: id={}, error={e}", channel.id);
                }
            }
        });
    }
}

/// テスト用のアラームポート実装
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 呼び出しを記録するテスト用のアラームポート
    #[derive(Default)]
    pub(crate) struct RecordingAlarms {
        pub(crate) channels: Mutex<Vec<&'static str>>,
        pub(crate) scheduled: Mutex<HashMap<u32, (DateTime<Utc>, NotificationPayload)>>,
        pub(crate) posted: Mutex<Vec<(u32, NotificationPayload)>>,
    }

    impl AlarmPort for RecordingAlarms {
        fn register_channel(&self, channel: &ChannelSpec) -> AppResult<()> {
            self.channels.lock().unwrap().push(channel.id);
            Ok(())
        }

        fn schedule(
            &self,
            key: u32,
            trigger_at: DateTime<Utc>,
            payload: NotificationPayload,
        ) -> AppResult<()> {
            // 同じキーは置き換え
            self.scheduled
                .lock()
                .unwrap()
                .insert(key, (trigger_at, payload));
            Ok(())
        }

        fn post_now(&self, notification_id: u32, payload: NotificationPayload) -> AppResult<()> {
            self.posted.lock().unwrap().push((notification_id, payload));
            Ok(())
        }

        fn cancel(&self, key: u32) -> AppResult<()> {
            self.scheduled.lock().unwrap().remove(&key);
            Ok(())
        }
    }
}
