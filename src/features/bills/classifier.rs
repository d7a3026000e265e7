/// 支払期日の分類器
///
/// 「今日」（時刻成分を持たない暦日）とリマインダーの支払期日から、
/// 表示バケットとフィルタ述語を導出する純粋関数群です。副作用はありません。
use super::models::{BillFilter, BillReminder};
use chrono::NaiveDate;

/// 「今週」の境界（日数、上限は排他的）
const WEEK_HORIZON_DAYS: i64 = 7;
/// 「今月」の境界（日数、上限は排他的）
const MONTH_HORIZON_DAYS: i64 = 30;

/// 支払期日から導出される表示バケット
///
/// バケットの表示順序はこの宣言順（Overdue → This Week → This Month → Later）
/// に固定されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DueBucket {
    Overdue,
    ThisWeek,
    ThisMonth,
    Later,
}

impl DueBucket {
    /// 全バケットを表示順で取得する
    pub const fn all() -> [DueBucket; 4] {
        [
            DueBucket::Overdue,
            DueBucket::ThisWeek,
            DueBucket::ThisMonth,
            DueBucket::Later,
        ]
    }

    /// 表示用ラベルを取得する
    pub fn label(&self) -> &'static str {
        match self {
            DueBucket::Overdue => "Overdue",
            DueBucket::ThisWeek => "This Week",
            DueBucket::ThisMonth => "This Month",
            DueBucket::Later => "Later",
        }
    }
}

/// 今日から支払期日までの残り日数を計算する
///
/// # 戻り値
/// 残り日数（期日超過の場合は負数）
pub fn days_remaining(today: NaiveDate, due: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// 支払期日をバケットに割り当てる
///
/// 境界は半開区間（下限を含み、上限を含まない）です。
/// ちょうど today+7d の期日は「This Week」ではなく「This Month」になります。
pub fn bucket_for(today: NaiveDate, due: NaiveDate) -> DueBucket {
    let days = days_remaining(today, due);
    if days < 0 {
        DueBucket::Overdue
    } else if days < WEEK_HORIZON_DAYS {
        DueBucket::ThisWeek
    } else if days < MONTH_HORIZON_DAYS {
        DueBucket::ThisMonth
    } else {
        DueBucket::Later
    }
}

/// 支払期日がフィルタにマッチするかを判定する
///
/// 「This Week」フィルタは today より厳密に後の期日のみを残します。
/// 今日が期日の請求書は「This Week」フィルタの結果に含まれません
/// （バケット割り当てとは異なる、意図的な仕様です）。
pub fn matches_filter(filter: BillFilter, today: NaiveDate, due: NaiveDate) -> bool {
    let days = days_remaining(today, due);
    match filter {
        BillFilter::All => true,
        BillFilter::ThisWeek => days > 0 && days < WEEK_HORIZON_DAYS,
        BillFilter::ThisMonth => days > 0 && days < MONTH_HORIZON_DAYS,
    }
}

/// リマインダー一覧にフィルタを適用する
///
/// # 引数
/// * `filter` - 適用するフィルタ
/// * `today` - 今日の暦日
/// * `bills` - 全リマインダー
///
/// # 戻り値
/// フィルタにマッチしたリマインダー（入力順を維持）
pub fn apply_filter(filter: BillFilter, today: NaiveDate, bills: &[BillReminder]) -> Vec<BillReminder> {
    bills
        .iter()
        .filter(|bill| matches_filter(filter, today, bill.due_date.date_naive()))
        .cloned()
        .collect()
}

/// リマインダーをバケットごとにグループ化する
///
/// # 戻り値
/// (バケット, リマインダー一覧) のペアを固定の表示順で返します。
/// メンバーのないバケットは結果に含まれません。
pub fn group_by_bucket(
    today: NaiveDate,
    bills: &[BillReminder],
) -> Vec<(DueBucket, Vec<BillReminder>)> {
    DueBucket::all()
        .into_iter()
        .filter_map(|bucket| {
            let members: Vec<BillReminder> = bills
                .iter()
                .filter(|bill| bucket_for(today, bill.due_date.date_naive()) == bucket)
                .cloned()
                .collect();
            if members.is_empty() {
                None
            } else {
                Some((bucket, members))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use quickcheck_macros::quickcheck;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
    }

    fn bill_due_in(days: i64) -> BillReminder {
        let due = Utc.with_ymd_and_hms(2026, 8, 27, 0, 0, 0).unwrap() + Duration::days(days);
        BillReminder::new(format!("bill{days}"), 100.0, due)
    }

    #[test]
    fn test_days_remaining() {
        assert_eq!(days_remaining(today(), today()), 0);
        assert_eq!(days_remaining(today(), today() + Duration::days(3)), 3);
        // 期日超過は負数
        assert_eq!(days_remaining(today(), today() - Duration::days(2)), -2);
    }

    #[test]
    fn test_bucket_boundaries() {
        let t = today();

        assert_eq!(bucket_for(t, t - Duration::days(1)), DueBucket::Overdue);
        assert_eq!(bucket_for(t, t), DueBucket::ThisWeek);
        assert_eq!(bucket_for(t, t + Duration::days(6)), DueBucket::ThisWeek);
        // ちょうど7日後は「This Month」（半開区間の境界ケース）
        assert_eq!(bucket_for(t, t + Duration::days(7)), DueBucket::ThisMonth);
        assert_eq!(bucket_for(t, t + Duration::days(29)), DueBucket::ThisMonth);
        assert_eq!(bucket_for(t, t + Duration::days(30)), DueBucket::Later);
        assert_eq!(bucket_for(t, t + Duration::days(365)), DueBucket::Later);
    }

    #[test]
    fn test_this_week_filter_excludes_today() {
        let t = today();

        // 今日が期日の請求書は「This Week」フィルタから除外される
        assert!(!matches_filter(BillFilter::ThisWeek, t, t));
        assert!(matches_filter(BillFilter::ThisWeek, t, t + Duration::days(1)));
        assert!(matches_filter(BillFilter::ThisWeek, t, t + Duration::days(6)));
        assert!(!matches_filter(BillFilter::ThisWeek, t, t + Duration::days(7)));
        assert!(!matches_filter(BillFilter::ThisWeek, t, t - Duration::days(1)));
    }

    #[test]
    fn test_fixture_filtering() {
        // 仕様のフィクスチャ: now-1d, now+1d, now+6d, now+10d, now+40d
        let bills = vec![
            bill_due_in(-1),
            bill_due_in(1),
            bill_due_in(6),
            bill_due_in(10),
            bill_due_in(40),
        ];

        let this_week = apply_filter(BillFilter::ThisWeek, today(), &bills);
        let names: Vec<&str> = this_week.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["bill1", "bill6"]);

        let this_month = apply_filter(BillFilter::ThisMonth, today(), &bills);
        let names: Vec<&str> = this_month.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["bill1", "bill6", "bill10"]);

        let all = apply_filter(BillFilter::All, today(), &bills);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_group_by_bucket_omits_empty_buckets() {
        let bills = vec![bill_due_in(2), bill_due_in(100)];

        let groups = group_by_bucket(today(), &bills);
        let buckets: Vec<DueBucket> = groups.iter().map(|(b, _)| *b).collect();
        assert_eq!(buckets, vec![DueBucket::ThisWeek, DueBucket::Later]);
    }

    #[test]
    fn test_group_by_bucket_fixed_order() {
        // 入力順に関係なく、バケットは固定の表示順で返される
        let bills = vec![
            bill_due_in(50),
            bill_due_in(-3),
            bill_due_in(10),
            bill_due_in(1),
        ];

        let groups = group_by_bucket(today(), &bills);
        let buckets: Vec<DueBucket> = groups.iter().map(|(b, _)| *b).collect();
        assert_eq!(
            buckets,
            vec![
                DueBucket::Overdue,
                DueBucket::ThisWeek,
                DueBucket::ThisMonth,
                DueBucket::Later,
            ]
        );
    }

    #[test]
    fn test_group_by_bucket_empty_input() {
        let groups = group_by_bucket(today(), &[]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(DueBucket::Overdue.label(), "Overdue");
        assert_eq!(DueBucket::ThisWeek.label(), "This Week");
        assert_eq!(DueBucket::ThisMonth.label(), "This Month");
        assert_eq!(DueBucket::Later.label(), "Later");
    }

    #[quickcheck]
    fn prop_bucket_matches_day_ranges(offset: i16) -> bool {
        let t = today();
        let due = t + Duration::days(offset as i64);
        let days = days_remaining(t, due);

        let expected = if days < 0 {
            DueBucket::Overdue
        } else if days < 7 {
            DueBucket::ThisWeek
        } else if days < 30 {
            DueBucket::ThisMonth
        } else {
            DueBucket::Later
        };

        bucket_for(t, due) == expected
    }

    #[quickcheck]
    fn prop_this_week_filter_implies_this_week_or_month_range(offset: i16) -> bool {
        let t = today();
        let due = t + Duration::days(offset as i64);

        // 「This Week」フィルタにマッチするなら「This Month」フィルタにもマッチする
        !matches_filter(BillFilter::ThisWeek, t, due)
            || matches_filter(BillFilter::ThisMonth, t, due)
    }

    #[quickcheck]
    fn prop_grouping_preserves_all_bills(offsets: Vec<i16>) -> bool {
        let bills: Vec<BillReminder> = offsets
            .iter()
            .map(|&offset| bill_due_in(offset as i64))
            .collect();

        let groups = group_by_bucket(today(), &bills);

        // 空バケットが含まれないこと
        let no_empty = groups.iter().all(|(_, members)| !members.is_empty());
        // 件数が保存されること
        let total: usize = groups.iter().map(|(_, members)| members.len()).sum();

        no_empty && total == bills.len()
    }
}
