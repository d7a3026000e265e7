/// 請求書リマインダーストア
///
/// 現在のユーザーのリマインダー一覧と選択中のフィルタを保持し、読み取り専用の
/// ビュー状態をUIに公開し、すべての変更をリモートコラボレータへ直列化します。
///
/// 変更操作はローカル状態を楽観的に書き換えません。リモートへの書き込みが
/// 確定した後、ライブ購読が配信する次のスナップショットによってローカル状態が
/// 丸ごと置き換えられます（結果整合性）。ローカル状態はキャッシュであり、
/// バックエンドと乖離することはありません。
use super::classifier;
use super::models::{
    normalize_name, validate_amount, BillFilter, BillPatch, BillReminder, BillReminderViewState,
    CreateBillDto, NewBillDocument, RawBillDocument, UpdateBillDto,
};
use super::repository::BillDocuments;
use crate::features::auth::AuthSession;
use crate::features::notifications::{AlarmPort, NotificationScheduler};
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use log::{debug, info};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// 新規追加時の期日通知タイトル
const UPCOMING_BILL_TITLE: &str = "Upcoming Bill";
/// 更新時の期日通知タイトル
const UPDATED_BILL_TITLE: &str = "Updated Bill";

/// 請求書リマインダーのライフサイクルを管理するサービス
///
/// リモートドキュメントストア・アラームポート・認証セッションは
/// コンストラクタで注入されます（プロセス全体のシングルトンは使用しません）。
pub struct BillReminderService<D, A, S>
where
    D: BillDocuments,
    A: AlarmPort,
    S: AuthSession,
{
    documents: Arc<D>,
    scheduler: NotificationScheduler<A>,
    session: Arc<S>,
    /// 最後に受信したスナップショットの全リマインダー
    all_bills: Mutex<Vec<BillReminder>>,
    /// 直近1件の削除済みリマインダー（後勝ちで上書き）
    last_deleted: Mutex<Option<BillReminder>>,
    /// 選択中の表示フィルタ
    selected_filter: Mutex<BillFilter>,
    /// UIへ公開するビュー状態（スナップショットごとに全体を置き換え）
    view_tx: watch::Sender<BillReminderViewState>,
}

impl<D, A, S> BillReminderService<D, A, S>
where
    D: BillDocuments,
    A: AlarmPort,
    S: AuthSession,
{
    /// 新しいサービスを作成する
    ///
    /// # 引数
    /// * `documents` - リモートドキュメントストア
    /// * `alarms` - プラットフォームのアラームポート
    /// * `session` - 認証セッション
    pub fn new(documents: Arc<D>, alarms: Arc<A>, session: Arc<S>) -> Self {
        let (view_tx, _) = watch::channel(BillReminderViewState::default());
        Self {
            documents,
            scheduler: NotificationScheduler::new(alarms),
            session,
            all_bills: Mutex::new(Vec::new()),
            last_deleted: Mutex::new(None),
            selected_filter: Mutex::new(BillFilter::All),
            view_tx,
        }
    }

    /// ビュー状態の受信チャンネルを取得する
    ///
    /// ビュー状態はスナップショットの到着またはフィルタ変更のたびに
    /// 単一の参照スワップで置き換えられます。
    pub fn view(&self) -> watch::Receiver<BillReminderViewState> {
        self.view_tx.subscribe()
    }

    /// リモートストアのライブ購読を実行する
    ///
    /// 現在のユーザーのドキュメントを購読し、スナップショットが届くたびに
    /// ローカルのリマインダー一覧を丸ごと置き換えて、フィルタを再適用します。
    /// 未ログインの場合は何もせずに戻ります。購読チャンネルが閉じられるまで
    /// 完了しません。
    pub async fn run_subscription(&self) -> AppResult<()> {
        let Some(user_id) = self.session.current_user_id() else {
            debug!("未ログインのため購読を開始しません");
            return Ok(());
        };

        let mut snapshots = self.documents.subscribe(&user_id).await?;
        info!("請求書の購読を開始しました: user_id={user_id}");

        while let Some(docs) = snapshots.recv().await {
            self.apply_snapshot(docs)?;
        }

        info!("請求書の購読が終了しました: user_id={user_id}");
        Ok(())
    }

    /// リマインダーを追加する
    ///
    /// リモートへの書き込みが確定した後にのみ、期日通知のスケジュールと
    /// 確認通知の表示を行います。ローカル一覧は直接変更されず、次の
    /// スナップショットで反映されます。未ログインの場合は何もしません。
    ///
    /// # 引数
    /// * `dto` - 作成するリマインダーの内容
    ///
    /// # 戻り値
    /// 成功時はOk(())、入力が不正な場合はバリデーションエラー
    pub async fn add_bill(&self, dto: CreateBillDto) -> AppResult<()> {
        let Some(user_id) = self.session.current_user_id() else {
            debug!("未ログインのため請求書の追加をスキップします");
            return Ok(());
        };

        let name = normalize_name(&dto.name)?;
        let amount = validate_amount(dto.amount)?;

        let doc = NewBillDocument {
            name: name.clone(),
            amount,
            due_date: dto.due_date,
            user_id,
        };
        let id = self.documents.add(doc).await?;
        info!("請求書を追加しました: id={id}, name={name}");

        // 書き込み確定後にのみ通知の副作用を発火する
        self.scheduler.schedule_due(
            &id,
            UPCOMING_BILL_TITLE,
            &Self::due_message(&name, amount),
            dto.due_date,
        );
        self.scheduler.show_confirmation(&name);

        Ok(())
    }

    /// リマインダーを更新する
    ///
    /// 追加時と同じバリデーションを行い、部分更新として書き込みます。
    /// 成功後、リマインダーが有効な場合は期日通知を再スケジュールします
    /// （決定的なキーにより既存の起床が置き換えられます）。
    ///
    /// # 引数
    /// * `id` - リマインダーID
    /// * `dto` - 更新内容
    pub async fn update_bill(&self, id: &str, dto: UpdateBillDto) -> AppResult<()> {
        let name = normalize_name(&dto.name)?;
        let amount = validate_amount(dto.amount)?;

        let patch = BillPatch {
            name: Some(name.clone()),
            amount: Some(amount),
            due_date: Some(dto.due_date),
            is_paid: None,
            reminder_enabled: dto.reminder_enabled,
        };
        self.documents.update(id, patch).await?;
        info!("請求書を更新しました: id={id}");

        if dto.reminder_enabled.unwrap_or(true) {
            self.scheduler.schedule_due(
                id,
                UPDATED_BILL_TITLE,
                &Self::due_message(&name, amount),
                dto.due_date,
            );
        }

        Ok(())
    }

    /// リマインダーを削除する
    ///
    /// 削除前にリマインダー全体を取り消しスロットへ退避します。
    /// 削除確定後、そのリマインダーの期日通知をキャンセルします。
    ///
    /// # 引数
    /// * `id` - リマインダーID
    ///
    /// # 戻り値
    /// 成功時はOk(())、ローカル一覧にIDが存在しない場合はNotFound
    pub async fn delete_bill(&self, id: &str) -> AppResult<()> {
        let bill = self
            .find_local(id)?
            .ok_or_else(|| AppError::not_found("請求書"))?;

        {
            // 取り消しスロットは直近1件のみ保持（後勝ちで上書き）
            let mut slot = Self::lock(&self.last_deleted, "取り消しスロット")?;
            *slot = Some(bill);
        }

        self.documents.delete(id).await?;
        info!("請求書を削除しました: id={id}");

        // 削除済みリマインダーの起床を残さない
        self.scheduler.cancel_due(id);

        Ok(())
    }

    /// 直近の削除を取り消す
    ///
    /// 取り消しスロットにリマインダーがあれば、その内容（名前・金額・期日）で
    /// 再追加し、スロットをクリアします。再追加は新しいドキュメントとして
    /// 行われるため、元のIDは復元されません。スロットが空の場合
    /// （連続2回目の取り消しなど）は何もしません。
    pub async fn undo_delete(&self) -> AppResult<()> {
        let deleted = Self::lock(&self.last_deleted, "取り消しスロット")?.take();

        match deleted {
            None => Ok(()),
            Some(bill) => {
                self.add_bill(CreateBillDto {
                    name: bill.name,
                    amount: bill.amount,
                    due_date: bill.due_date,
                })
                .await
            }
        }
    }

    /// 支払済みフラグを反転する
    ///
    /// 支払済みへ変わった場合は、そのリマインダーの期日通知をキャンセルします。
    ///
    /// # 引数
    /// * `id` - リマインダーID
    pub async fn toggle_paid(&self, id: &str) -> AppResult<()> {
        let bill = self
            .find_local(id)?
            .ok_or_else(|| AppError::not_found("請求書"))?;
        let now_paid = !bill.is_paid;

        let patch = BillPatch {
            is_paid: Some(now_paid),
            ..BillPatch::default()
        };
        self.documents.update(id, patch).await?;
        debug!("支払状態を更新しました: id={id}, is_paid={now_paid}");

        if now_paid {
            self.scheduler.cancel_due(id);
        }

        Ok(())
    }

    /// リマインダー有効フラグを反転する
    ///
    /// # 引数
    /// * `id` - リマインダーID
    pub async fn toggle_reminder(&self, id: &str) -> AppResult<()> {
        let bill = self
            .find_local(id)?
            .ok_or_else(|| AppError::not_found("請求書"))?;
        let enabled = !bill.reminder_enabled;

        let patch = BillPatch {
            reminder_enabled: Some(enabled),
            ..BillPatch::default()
        };
        self.documents.update(id, patch).await?;
        debug!("リマインダー有効状態を更新しました: id={id}, enabled={enabled}");

        Ok(())
    }

    /// 表示フィルタを変更する
    ///
    /// 最後に受信した全リマインダーからフィルタを再計算します。
    /// ネットワークアクセスは行いません。
    pub fn set_filter(&self, filter: BillFilter) -> AppResult<()> {
        {
            let mut selected = Self::lock(&self.selected_filter, "フィルタ")?;
            *selected = filter;
        }
        self.publish()
    }

    /// スナップショットを適用する
    ///
    /// 必須フィールドが欠けたドキュメントをスキップしながらデコードし、
    /// ローカルの全リマインダーを丸ごと置き換えて、ビュー状態を再公開します。
    fn apply_snapshot(&self, docs: Vec<RawBillDocument>) -> AppResult<()> {
        let total = docs.len();
        let bills: Vec<BillReminder> = docs
            .into_iter()
            .filter_map(RawBillDocument::into_bill)
            .collect();

        let skipped = total - bills.len();
        if skipped > 0 {
            debug!("必須フィールドが欠けたドキュメントをスキップしました: {skipped}件");
        }

        {
            let mut all = Self::lock(&self.all_bills, "請求書リスト")?;
            *all = bills;
        }

        self.publish()
    }

    /// 現在のフィルタを適用してビュー状態を公開する
    fn publish(&self) -> AppResult<()> {
        let filter = *Self::lock(&self.selected_filter, "フィルタ")?;
        let bills = {
            let all = Self::lock(&self.all_bills, "請求書リスト")?;
            classifier::apply_filter(filter, Utc::now().date_naive(), &all)
        };

        // フィールド単位の変更ではなく、状態全体を1回のスワップで置き換える
        self.view_tx.send_replace(BillReminderViewState {
            bills,
            selected_filter: filter,
        });

        Ok(())
    }

    /// ローカル一覧からリマインダーを検索する
    fn find_local(&self, id: &str) -> AppResult<Option<BillReminder>> {
        let all = Self::lock(&self.all_bills, "請求書リスト")?;
        Ok(all.iter().find(|bill| bill.id == id).cloned())
    }

    /// 期日通知の本文を組み立てる
    fn due_message(name: &str, amount: f64) -> String {
        format!("\"{name}\" of Ksh {amount:.2} is due soon!")
    }

    /// ロックを取得する（ポイズニングは並行処理エラーに変換）
    fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> AppResult<MutexGuard<'a, T>> {
        mutex
            .lock()
            .map_err(|_| AppError::concurrency(format!("{what}のロック取得に失敗しました")))
    }
}
