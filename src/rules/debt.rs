//! Debt rules: legal balance changes on a member

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::Member,
};

/// Charge a rent fee to the member's outstanding debt.
pub fn apply_charge(member: Member, fee: Decimal) -> Member {
    Member {
        outstanding_debt: member.outstanding_debt + fee,
        ..member
    }
}

/// Pay off part of the member's debt. Payments never exceed current debt.
pub fn apply_payment(member: Member, amount: Decimal) -> AppResult<Member> {
    if amount > member.outstanding_debt {
        return Err(AppError::InvalidOperation(
            "Payment amount cannot exceed outstanding debt".to_string(),
        ));
    }
    Ok(Member {
        outstanding_debt: member.outstanding_debt - amount,
        ..member
    })
}

/// Wipe the member's debt.
pub fn clear(member: Member) -> Member {
    Member {
        outstanding_debt: Decimal::ZERO,
        ..member
    }
}
