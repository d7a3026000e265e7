/// 請求書リマインダー機能モジュール
///
/// このモジュールは、請求書リマインダーのライフサイクルに関連するすべての
/// 機能を提供します：
/// - リマインダーの作成、更新、削除（1段階の取り消し付き）
/// - リモートドキュメントストアのライブ購読とビュー状態の公開
/// - 支払期日の分類（Overdue / This Week / This Month / Later）とフィルタ
/// - APIサーバー経由でのドキュメント操作
pub mod api;
pub mod classifier;
pub mod models;
pub mod repository;
pub mod service;

// 公開インターフェース
pub use api::ApiBillRepository;
pub use classifier::{
    apply_filter, bucket_for, days_remaining, group_by_bucket, matches_filter, DueBucket,
};
pub use models::{
    normalize_name, parse_amount, validate_amount, BillFilter, BillPatch, BillReminder,
    BillReminderViewState, CreateBillDto, NewBillDocument, RawBillDocument, UpdateBillDto,
};
pub use repository::BillDocuments;
pub use service::BillReminderService;
