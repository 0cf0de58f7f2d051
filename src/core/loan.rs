use crate::core::installment::Installment;
use crate::core::user::UserId;
use crate::error::{EngineError, EngineResult};
use crate::lifecycle::permissions::Operation;
use crate::schedule::generator::ScheduleGenerator;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Current stage of a loan's approval / disbursement / repayment process.
///
/// Valid transitions:
///
/// ```text
/// applied ──► approved ──► disbursed ──► closed
///    │
///    └──────► rejected
/// ```
///
/// `rejected` and `closed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Applied,
    Approved,
    Rejected,
    Disbursed,
    Closed,
}

impl LoanStatus {
    /// Terminal states accept no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Rejected | LoanStatus::Closed)
    }

    /// Whether `next` is a legal forward edge of the status machine.
    pub fn can_transition_to(self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Applied, LoanStatus::Approved)
                | (LoanStatus::Applied, LoanStatus::Rejected)
                | (LoanStatus::Approved, LoanStatus::Disbursed)
                | (LoanStatus::Disbursed, LoanStatus::Closed)
        )
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoanStatus::Applied => "applied",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Disbursed => "disbursed",
            LoanStatus::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

/// The originally agreed terms of a loan. Immutable once applied;
/// recalculation always regenerates the schedule from these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub applicant: UserId,
    /// Amount lent. Must be positive.
    pub principal: Decimal,
    /// Annual interest rate in percent (e.g. `12` for 12% APR). Must be ≥ 0.
    pub annual_rate_percent: Decimal,
    /// Term in whole months. Must be positive.
    pub term_months: u32,
    /// Free-text purpose stated on the application.
    pub purpose: String,
}

/// A loan and its derived accounting state.
///
/// The identity and terms are fixed at application time. The schedule is
/// generated once and replaced only by explicit recalculation; the
/// outstanding balance is the authoritative current debt. Audit fields
/// are stamped exactly once, by the transition that owns them.
///
/// Invariant: `0 ≤ outstanding_balance ≤ principal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    id: Uuid,
    applicant: UserId,
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: u32,
    purpose: String,
    schedule: Vec<Installment>,
    outstanding_balance: Decimal,
    status: LoanStatus,
    applied_at: DateTime<Utc>,
    approved_by: Option<UserId>,
    approved_at: Option<DateTime<Utc>>,
    disbursed_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Create a loan in `applied` status, generating its amortization
    /// schedule from the terms. The schedule starts on the application date.
    pub fn apply(terms: LoanTerms, applied_at: DateTime<Utc>) -> EngineResult<Self> {
        let schedule = ScheduleGenerator::generate(
            terms.principal,
            terms.annual_rate_percent,
            terms.term_months,
            applied_at.date_naive(),
        )?;

        Ok(Self {
            id: Uuid::new_v4(),
            applicant: terms.applicant,
            principal: terms.principal,
            annual_rate_percent: terms.annual_rate_percent,
            term_months: terms.term_months,
            purpose: terms.purpose,
            schedule,
            outstanding_balance: terms.principal,
            status: LoanStatus::Applied,
            applied_at,
            approved_by: None,
            approved_at: None,
            disbursed_at: None,
            closed_at: None,
        })
    }

    fn guard(&self, operation: Operation, required: LoanStatus) -> EngineResult<()> {
        if self.status != required {
            return Err(EngineError::InvalidState {
                loan_id: self.id,
                operation,
                status: self.status,
            });
        }
        Ok(())
    }

    /// `applied → approved`. Records the reviewer and timestamp.
    pub fn approve(&mut self, reviewer: UserId, at: DateTime<Utc>) -> EngineResult<()> {
        self.guard(Operation::Approve, LoanStatus::Applied)?;
        self.status = LoanStatus::Approved;
        self.approved_by = Some(reviewer);
        self.approved_at = Some(at);
        Ok(())
    }

    /// `applied → rejected`. Terminal. Records the reviewer and timestamp.
    pub fn reject(&mut self, reviewer: UserId, at: DateTime<Utc>) -> EngineResult<()> {
        self.guard(Operation::Reject, LoanStatus::Applied)?;
        self.status = LoanStatus::Rejected;
        self.approved_by = Some(reviewer);
        self.approved_at = Some(at);
        Ok(())
    }

    /// `approved → disbursed`. Funds go out; the outstanding balance is
    /// reset to the full principal and repayment begins.
    pub fn disburse(&mut self, at: DateTime<Utc>) -> EngineResult<()> {
        self.guard(Operation::Disburse, LoanStatus::Approved)?;
        self.status = LoanStatus::Disbursed;
        self.disbursed_at = Some(at);
        self.outstanding_balance = self.principal;
        Ok(())
    }

    /// `disbursed → closed`, driven by reconciliation when the balance
    /// reaches zero. Only a disbursed loan can close; in any other status
    /// this is a no-op, so the `closed_at` stamp is never overwritten.
    pub(crate) fn mark_closed(&mut self, at: DateTime<Utc>) {
        if self.status != LoanStatus::Disbursed {
            return;
        }
        self.status = LoanStatus::Closed;
        self.closed_at = Some(at);
    }

    pub(crate) fn set_outstanding_balance(&mut self, balance: Decimal) {
        self.outstanding_balance = balance;
    }

    pub(crate) fn replace_schedule(&mut self, schedule: Vec<Installment>) {
        self.schedule = schedule;
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn applicant(&self) -> &UserId {
        &self.applicant
    }

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn schedule(&self) -> &[Installment] {
        &self.schedule
    }

    pub fn outstanding_balance(&self) -> Decimal {
        self.outstanding_balance
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }

    pub fn approved_by(&self) -> Option<&UserId> {
        self.approved_by.as_ref()
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn disbursed_at(&self) -> Option<DateTime<Utc>> {
        self.disbursed_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Fraction of principal repaid, for display.
    pub fn progress_ratio(&self) -> f64 {
        let repaid = (self.principal - self.outstanding_balance) / self.principal;
        repaid.to_string().parse::<f64>().unwrap_or(0.0)
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loan {} [{}] {} over {} months at {}%, outstanding {}",
            self.id,
            self.status,
            self.principal,
            self.term_months,
            self.annual_rate_percent,
            self.outstanding_balance
        )
    }
}
