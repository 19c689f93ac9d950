//! Repayment schedule generation and settlement arithmetic.
//!
//! Crop-season loans repay as a single bullet at harvest; every other product
//! amortizes monthly with the standard annuity payment, interest accruing on
//! the declining outstanding balance. Amounts stay unrounded; presentation
//! layers round for display.

use chrono::{Duration, Months, NaiveDate};

use super::domain::{LoanApplication, LoanType, RepaymentInstallment, Season};

/// Days from application to the harvest bullet payment, by season.
const KHARIF_HARVEST_DAYS: i64 = 180;
const RABI_HARVEST_DAYS: i64 = 120;

/// Generate the full schedule for a loan starting from `start` (normally the
/// disbursement date). Replaces any prior schedule wholesale.
pub fn build_schedule(loan: &LoanApplication, start: NaiveDate) -> Vec<RepaymentInstallment> {
    match loan.loan_type {
        LoanType::CropSeason => seasonal_schedule(loan, start),
        _ => amortizing_schedule(loan, start),
    }
}

fn seasonal_schedule(loan: &LoanApplication, start: NaiveDate) -> Vec<RepaymentInstallment> {
    let harvest_days = match loan.season {
        Some(Season::Rabi) => RABI_HARVEST_DAYS,
        _ => KHARIF_HARVEST_DAYS,
    };
    let total = loan.amount * (1.0 + loan.interest_rate / 100.0);

    vec![RepaymentInstallment {
        due_date: start + Duration::days(harvest_days),
        amount: total,
        principal: loan.amount,
        interest: total - loan.amount,
        paid: false,
        paid_date: None,
    }]
}

fn amortizing_schedule(loan: &LoanApplication, start: NaiveDate) -> Vec<RepaymentInstallment> {
    let monthly_rate = loan.interest_rate / 12.0 / 100.0;
    let emi = monthly_payment(loan.amount, monthly_rate, loan.tenure_months);

    let mut schedule = Vec::with_capacity(loan.tenure_months as usize);
    let mut outstanding = loan.amount;
    for month in 1..=loan.tenure_months {
        let interest = outstanding * monthly_rate;
        let principal = emi - interest;
        outstanding -= principal;

        schedule.push(RepaymentInstallment {
            due_date: start + Months::new(month),
            amount: emi,
            principal,
            interest,
            paid: false,
            paid_date: None,
        });
    }

    schedule
}

/// Standard annuity payment `P·r·(1+r)^n / ((1+r)^n − 1)`; a zero rate degrades
/// to straight-line principal.
pub fn monthly_payment(principal: f64, monthly_rate: f64, tenure_months: u32) -> f64 {
    if tenure_months == 0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return principal / tenure_months as f64;
    }
    let growth = (1.0 + monthly_rate).powi(tenure_months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Apply a payment to the schedule in due-date order. Only full installments
/// settle; a remainder smaller than the next unpaid installment is left
/// unapplied. Returns the principal portion settled, which the caller deducts
/// from the loan's outstanding amount.
pub fn apply_payment(
    schedule: &mut [RepaymentInstallment],
    amount: f64,
    paid_on: NaiveDate,
) -> f64 {
    let mut remaining = amount;
    let mut settled_principal = 0.0;

    for installment in schedule.iter_mut() {
        if installment.paid || remaining < installment.amount {
            continue;
        }
        installment.paid = true;
        installment.paid_date = Some(paid_on);
        remaining -= installment.amount;
        settled_principal += installment.principal;
    }

    settled_principal
}

/// True once every installment has been settled.
pub fn is_settled(schedule: &[RepaymentInstallment]) -> bool {
    !schedule.is_empty() && schedule.iter().all(|installment| installment.paid)
}

/// Longest overdue span across unpaid installments, in days. Zero when nothing
/// is overdue.
pub fn max_overdue_days(schedule: &[RepaymentInstallment], today: NaiveDate) -> i64 {
    schedule
        .iter()
        .filter(|installment| !installment.paid && installment.due_date < today)
        .map(|installment| (today - installment.due_date).num_days())
        .max()
        .unwrap_or(0)
}
