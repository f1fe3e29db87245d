//! Balance ledger calculator.
//!
//! A vendor's account balance is carried day by day:
//! `balance = previous + top_up - total_ad_cost`. Deposits and withdrawals
//! affect revenue, never the balance. The fold is explicit: the accumulator
//! is an argument, not captured state, so per-vendor legs can run in
//! parallel and each step is unit-testable.

use crate::domain::{DailyVendorRecord, Decimal};
use chrono::{Datelike, NaiveDate};

/// One day's carried balance for a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBalance {
    pub day: NaiveDate,
    pub running_balance: Decimal,
}

/// The calendar month immediately before `date`'s month, as (year, month).
pub fn prior_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    }
}

/// The first day of `date`'s month.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // with_day(1) cannot fail for day 1 of an existing month
    date.with_day(1).unwrap_or(date)
}

/// Fold the prior-month checkpoint forward through the partial-month
/// prefix (records strictly before the range start, same month) to get
/// the opening balance for the first day of the range.
///
/// A missing checkpoint is passed in as zero; a vendor with no prior
/// activity opens at zero.
pub fn opening_balance(checkpoint: Decimal, prefix_records: &[DailyVendorRecord]) -> Decimal {
    prefix_records
        .iter()
        .fold(checkpoint, |balance, record| {
            balance + record.top_up_amount - record.total_ad_cost()
        })
}

/// Walk the in-range records in ascending day order, emitting the carried
/// balance for each day that has a record.
///
/// Gaps in the daily sequence do not reset the balance; the carried value
/// simply persists (skipped days are not materialized).
pub fn fold_running_balances(
    records: &[DailyVendorRecord],
    opening: Decimal,
) -> Vec<DailyBalance> {
    let mut out = Vec::with_capacity(records.len());
    let mut balance = opening;
    for record in records {
        balance = balance + record.top_up_amount - record.total_ad_cost();
        out.push(DailyBalance {
            day: record.day,
            running_balance: balance,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VendorId;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn record(d: &str, top_up: &str, ad_expense: &str) -> DailyVendorRecord {
        let mut record = DailyVendorRecord::empty(VendorId::new(1), day(d));
        record.top_up_amount = dec(top_up);
        record.ad_expense = dec(ad_expense);
        record
    }

    #[test]
    fn prior_month_handles_january() {
        assert_eq!(prior_month(day("2024-01-15")), (2023, 12));
        assert_eq!(prior_month(day("2024-03-15")), (2024, 2));
    }

    #[test]
    fn first_of_month_truncates() {
        assert_eq!(first_of_month(day("2024-03-15")), day("2024-03-01"));
        assert_eq!(first_of_month(day("2024-03-01")), day("2024-03-01"));
    }

    #[test]
    fn balance_carries_forward_from_checkpoint() {
        // Prior month closed at 500; day1 topUp=50 cost=30 -> 520;
        // day2 topUp=0 cost=20 -> 500.
        let records = vec![
            record("2024-03-01", "50", "30"),
            record("2024-03-02", "0", "20"),
        ];
        let balances = fold_running_balances(&records, dec("500"));
        assert_eq!(balances[0].running_balance, dec("520"));
        assert_eq!(balances[1].running_balance, dec("500"));
    }

    #[test]
    fn balance_continuity_holds_across_the_fold() {
        let records = vec![
            record("2024-03-01", "10", "3"),
            record("2024-03-02", "0", "7.5"),
            record("2024-03-03", "100", "0.25"),
        ];
        let balances = fold_running_balances(&records, dec("42"));
        for i in 1..balances.len() {
            let expected = balances[i - 1].running_balance + records[i].top_up_amount
                - records[i].total_ad_cost();
            assert_eq!(balances[i].running_balance, expected);
        }
    }

    #[test]
    fn gap_in_records_does_not_reset_balance() {
        let records = vec![
            record("2024-03-01", "100", "0"),
            record("2024-03-20", "0", "40"),
        ];
        let balances = fold_running_balances(&records, Decimal::zero());
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[1].running_balance, dec("60"));
    }

    #[test]
    fn opening_balance_folds_the_month_prefix() {
        let prefix = vec![
            record("2024-03-01", "50", "30"),
            record("2024-03-02", "0", "20"),
        ];
        assert_eq!(opening_balance(dec("500"), &prefix), dec("500"));
        assert_eq!(opening_balance(Decimal::zero(), &[]), Decimal::zero());
    }

    #[test]
    fn commission_feeds_the_balance_fold() {
        let mut r = record("2024-03-01", "0", "100");
        r.ads_chargeback = dec("10");
        r.ads_commission_rate = dec("10");
        let balances = fold_running_balances(&[r], dec("200"));
        assert_eq!(balances[0].running_balance, dec("80"));
    }

    #[test]
    fn checkpoint_equivalence_on_a_synthetic_ledger() {
        // Folding from the vendor's first-ever record must equal folding
        // from a mid-history checkpoint plus the remaining prefix.
        let history = vec![
            record("2024-01-05", "100", "10"),
            record("2024-01-20", "0", "25"),
            record("2024-02-03", "50", "5"),
            record("2024-02-28", "0", "30"),
            record("2024-03-02", "10", "0"),
            record("2024-03-09", "0", "12"),
        ];

        // From epoch, everything before 2024-03-10 is the opening balance.
        let from_epoch = opening_balance(Decimal::zero(), &history);

        // Via checkpoint: close out February, then fold March's prefix.
        let feb_close = opening_balance(Decimal::zero(), &history[..4]);
        let via_checkpoint = opening_balance(feb_close, &history[4..]);

        assert_eq!(from_epoch, via_checkpoint);
    }
}
