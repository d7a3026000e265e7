/// 通知チャンネルの重要度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelImportance {
    /// 通常の重要度（確認通知など）
    Default,
    /// 高い重要度（期日通知など）
    High,
}

/// 通知チャンネルの定義
///
/// グループ化された通知チャンネルを必要とするプラットフォーム向けの
/// チャンネル登録情報です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub importance: ChannelImportance,
}

/// 期日通知用チャンネル
pub const BILL_REMINDER_CHANNEL: ChannelSpec = ChannelSpec {
    id: "bill_reminder_channel",
    name: "Bill Reminders",
    importance: ChannelImportance::High,
};

/// 追加確認通知用チャンネル
pub const CONFIRMATION_CHANNEL: ChannelSpec = ChannelSpec {
    id: "confirmation_channel",
    name: "Bill Confirmation",
    importance: ChannelImportance::Default,
};

/// 通知ペイロード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// 配信先チャンネルID
    pub channel_id: &'static str,
    /// 通知タイトル
    pub title: String,
    /// 通知本文
    pub body: String,
}

impl NotificationPayload {
    pub fn new<T: Into<String>, B: Into<String>>(
        channel: &ChannelSpec,
        title: T,
        body: B,
    ) -> Self {
        Self {
            channel_id: channel.id,
            title: title.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_constants() {
        assert_eq!(BILL_REMINDER_CHANNEL.id, "bill_reminder_channel");
        assert_eq!(BILL_REMINDER_CHANNEL.importance, ChannelImportance::High);
        assert_eq!(CONFIRMATION_CHANNEL.id, "confirmation_channel");
        assert_eq!(CONFIRMATION_CHANNEL.importance, ChannelImportance::Default);
    }

    #[test]
    fn test_payload_targets_channel() {
        let payload = NotificationPayload::new(&CONFIRMATION_CHANNEL, "title", "body");
        assert_eq!(payload.channel_id, "confirmation_channel");
        assert_eq!(payload.title, "title");
        assert_eq!(payload.body, "body");
    }
}
