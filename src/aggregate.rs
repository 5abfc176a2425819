use crate::{
    amount::REPORT_PRECISION,
    record::{AmountRecord, Record},
    Amount,
};
use num_traits::Zero;

/// User whose balance the reports track unless configured otherwise.
pub const DEFAULT_TARGET_USER_ID: u64 = 2_456_938_384_156_277_127;

/// Running totals over one decode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    target_user_id: u64,
    total_credit: Amount,
    total_debit: Amount,
    autopay_started_count: u64,
    autopay_ended_count: u64,
    target_user_credit: Amount,
    target_user_debit: Amount,
}

/// Final result of a decode pass.
///
/// Totals are rounded to two decimal places; the target balance is not.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub total_credit_amount: Amount,
    pub total_debit_amount: Amount,
    pub autopays_started: u64,
    pub autopays_ended: u64,
    pub target_user_id: u64,
    pub target_user_balance: Amount,
}

impl Aggregate {
    pub fn new(target_user_id: u64) -> Self {
        Aggregate {
            target_user_id,
            total_credit: Amount::zero(),
            total_debit: Amount::zero(),
            autopay_started_count: 0,
            autopay_ended_count: 0,
            target_user_credit: Amount::zero(),
            target_user_debit: Amount::zero(),
        }
    }

    pub fn target_user_id(&self) -> u64 {
        self.target_user_id
    }

    pub fn target_user_credit(&self) -> Amount {
        self.target_user_credit
    }

    pub fn target_user_debit(&self) -> Amount {
        self.target_user_debit
    }

    pub fn fold(&mut self, record: &Record) {
        match record {
            Record::Credit(credit) => {
                self.total_credit += credit.amount;
                if self.is_target(credit) {
                    self.target_user_credit += credit.amount;
                }
            }
            Record::Debit(debit) => {
                self.total_debit += debit.amount;
                if self.is_target(debit) {
                    self.target_user_debit += debit.amount;
                }
            }
            Record::AutopayStarted(_) => self.autopay_started_count += 1,
            Record::AutopayEnded(_) => self.autopay_ended_count += 1,
            Record::Unrecognized { .. } => {}
        }
    }

    pub fn balance_for_target(&self) -> Amount {
        self.target_user_credit - self.target_user_debit
    }

    pub fn report(&self) -> Report {
        Report {
            total_credit_amount: self.total_credit.rounded(REPORT_PRECISION),
            total_debit_amount: self.total_debit.rounded(REPORT_PRECISION),
            autopays_started: self.autopay_started_count,
            autopays_ended: self.autopay_ended_count,
            target_user_id: self.target_user_id,
            target_user_balance: self.balance_for_target(),
        }
    }

    fn is_target(&self, record: &AmountRecord) -> bool {
        record.data.user_id == self.target_user_id
    }
}

impl Default for Aggregate {
    fn default() -> Self {
        Aggregate::new(DEFAULT_TARGET_USER_ID)
    }
}
