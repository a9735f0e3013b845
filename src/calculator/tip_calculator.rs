use serde::Serialize;
use thiserror::Error;

pub const MAX_TIP_PERCENT: u32 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum TipError {
    #[error("bill amount must be a non-negative number, got {0}")]
    InvalidBill(f64),
    #[error("tip percent must be between 0 and {max}, got {0}", max = MAX_TIP_PERCENT)]
    InvalidPercent(u32),
    #[error("at least one person has to split the bill")]
    NoPeople,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TipBreakdown {
    pub tip_amount: f64,
    pub total_amount: f64,
    pub per_person: f64,
}

pub fn calculate_tip(bill: f64, tip_percent: u32, people: u32) -> Result<TipBreakdown, TipError> {
    if !bill.is_finite() || bill < 0.0 {
        return Err(TipError::InvalidBill(bill));
    }
    if tip_percent > MAX_TIP_PERCENT {
        return Err(TipError::InvalidPercent(tip_percent));
    }
    if people == 0 {
        return Err(TipError::NoPeople);
    }

    let tip_amount = bill * (tip_percent as f64 / 100.0);
    let total_amount = bill + tip_amount;

    Ok(TipBreakdown {
        tip_amount,
        total_amount,
        per_person: total_amount / people as f64,
    })
}

/// Two decimals with thousands separators, e.g. `1,234.50`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_inputs() {
        let breakdown = calculate_tip(100.0, 10, 1).unwrap();
        assert_eq!(breakdown.tip_amount, 10.0);
        assert_eq!(breakdown.total_amount, 110.0);
        assert_eq!(breakdown.per_person, 110.0);
    }

    #[test]
    fn test_split_between_people() {
        let breakdown = calculate_tip(1000.0, 20, 4).unwrap();
        assert_eq!(breakdown.tip_amount, 200.0);
        assert_eq!(breakdown.total_amount, 1200.0);
        assert_eq!(breakdown.per_person, 300.0);
    }

    #[test]
    fn test_rejects_out_of_range_input() {
        assert_eq!(calculate_tip(-1.0, 10, 1), Err(TipError::InvalidBill(-1.0)));
        assert_eq!(calculate_tip(100.0, 31, 1), Err(TipError::InvalidPercent(31)));
        assert_eq!(calculate_tip(100.0, 10, 0), Err(TipError::NoPeople));
        assert!(calculate_tip(f64::NAN, 10, 1).is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(110.0), "110.00");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-2500.0), "-2,500.00");
    }
}
