// 機能モジュール構造
pub mod features;
pub mod shared;

// よく使う型の再エクスポート
pub use features::auth::{AuthSession, FixedSession};
pub use features::bills::{
    ApiBillRepository, BillDocuments, BillFilter, BillReminder, BillReminderService,
    BillReminderViewState, CreateBillDto, DueBucket, UpdateBillDto,
};
pub use features::notifications::{AlarmPort, NotificationScheduler};
pub use shared::config::environment::{initialize_logging_system, load_environment_variables};
pub use shared::errors::{AppError, AppResult, ErrorSeverity};
