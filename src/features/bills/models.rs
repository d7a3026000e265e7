use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 請求書リマインダーのデータモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BillReminder {
    pub id: String,
    pub name: String,              // 請求書名（前後の空白を除去した非空文字列）
    pub amount: f64,               // 金額（0以上）
    pub due_date: DateTime<Utc>,   // 支払期日（時刻部分は意味を持たない）
    pub is_paid: bool,             // 支払済みフラグ
    pub reminder_enabled: bool,    // リマインダー有効フラグ
}

impl BillReminder {
    /// 新しいリマインダーを作成する
    ///
    /// IDはクライアント側のプレースホルダとしてUUIDを生成します。
    /// サーバーへの保存時にはサーバー採番のIDに置き換わります。
    pub fn new<S: Into<String>>(name: S, amount: f64, due_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            amount,
            due_date,
            is_paid: false,
            reminder_enabled: true,
        }
    }
}

/// リモートストアから受信した生の請求書ドキュメント
///
/// リモートストアには部分的に不正な行が存在しうるため、すべてのフィールドを
/// オプションとして受け取り、デコード時に必須フィールドを検査します。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawBillDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub reminder_enabled: Option<bool>,
}

impl RawBillDocument {
    /// 生ドキュメントをリマインダーにデコードする
    ///
    /// # 契約（欠損時スキップ）
    /// 必須フィールド（id・name・amount・dueDate）のいずれかが欠けている
    /// ドキュメントはエラーではなくNoneを返し、購読スナップショットの
    /// デコードでは黙ってスキップされます。オプションフィールドには
    /// デフォルト値（isPaid=false, reminderEnabled=true）が適用されます。
    ///
    /// # 戻り値
    /// デコードされたリマインダー、必須フィールドが欠けている場合はNone
    pub fn into_bill(self) -> Option<BillReminder> {
        Some(BillReminder {
            id: self.id?,
            name: self.name?,
            amount: self.amount?,
            due_date: self.due_date?,
            is_paid: self.is_paid.unwrap_or(false),
            reminder_enabled: self.reminder_enabled.unwrap_or(true),
        })
    }
}

/// リマインダー作成時にリモートストアへ書き込むドキュメント
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBillDocument {
    pub name: String,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub user_id: String,
}

/// リモートストアへの部分更新パッチ
///
/// Noneのフィールドは送信されず、リモート側の値が維持されます。
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BillPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_enabled: Option<bool>,
}

/// リマインダー作成用DTO
#[derive(Debug, Clone)]
pub struct CreateBillDto {
    pub name: String,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
}

/// リマインダー更新用DTO
#[derive(Debug, Clone)]
pub struct UpdateBillDto {
    pub name: String,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub reminder_enabled: Option<bool>,
}

/// 表示フィルタの選択肢
///
/// プロセスローカルなUI状態であり、永続化されません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillFilter {
    #[default]
    All,
    ThisWeek,
    ThisMonth,
}

impl BillFilter {
    /// 表示用ラベルを取得する
    pub fn label(&self) -> &'static str {
        match self {
            BillFilter::All => "All",
            BillFilter::ThisWeek => "This Week",
            BillFilter::ThisMonth => "This Month",
        }
    }
}

/// UIに公開される読み取り専用のビュー状態
///
/// 購読スナップショットの到着ごとに全体が置き換えられます（フィールド単位の
/// 変更は行いません）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillReminderViewState {
    pub bills: Vec<BillReminder>,
    pub selected_filter: BillFilter,
}

/// 請求書名を正規化する
///
/// # 引数
/// * `name` - 入力された請求書名
///
/// # 戻り値
/// 前後の空白を除去した名前、空の場合はバリデーションエラー
pub fn normalize_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("請求書名を入力してください"));
    }
    Ok(trimmed.to_string())
}

/// 金額を検証する
///
/// # 引数
/// * `amount` - 入力された金額
///
/// # 戻り値
/// 検証済みの金額、負数または非有限値の場合はバリデーションエラー
pub fn validate_amount(amount: f64) -> AppResult<f64> {
    if !amount.is_finite() {
        return Err(AppError::validation("金額は数値で入力してください"));
    }
    if amount < 0.0 {
        return Err(AppError::validation("金額は0以上で入力してください"));
    }
    Ok(amount)
}

/// フォーム入力の金額文字列をパースする
///
/// # 引数
/// * `text` - 入力された金額文字列
///
/// # 戻り値
/// パース・検証済みの金額、不正な入力の場合はバリデーションエラー
pub fn parse_amount(text: &str) -> AppResult<f64> {
    let amount: f64 = text
        .trim()
        .parse()
        .map_err(|_| AppError::validation("金額は数値で入力してください"))?;
    validate_amount(amount)
}
