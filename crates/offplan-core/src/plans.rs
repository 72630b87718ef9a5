use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Installment plans
// ---------------------------------------------------------------------------

/// How often pre-handover installments fall due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentFrequency {
    #[default]
    Monthly,
    Quarterly,
}

impl InstallmentFrequency {
    /// Calendar months between consecutive installments.
    pub fn step_months(&self) -> u32 {
        match self {
            InstallmentFrequency::Monthly => 1,
            InstallmentFrequency::Quarterly => 3,
        }
    }

    /// Number of installments needed to cover `installment_months`.
    pub fn installment_count(&self, installment_months: u32) -> u32 {
        match self {
            InstallmentFrequency::Monthly => installment_months,
            InstallmentFrequency::Quarterly => installment_months.div_ceil(3),
        }
    }
}

/// A developer payment plan: down payment, installments, handover and an
/// optional post-handover tail, all as shares of the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub down_payment_percentage: Percent,
    pub handover_payment_percentage: Percent,
    /// Months over which installments are spread (0 if none)
    #[serde(default)]
    pub installment_months: u32,
    #[serde(default)]
    pub installment_frequency: InstallmentFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_handover_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_handover_percentage: Option<Percent>,
}

impl PaymentPlan {
    pub fn post_handover_share(&self) -> Percent {
        self.post_handover_percentage.unwrap_or(Decimal::ZERO)
    }

    /// Share left for pre-handover installments once every other component
    /// is taken out. May be negative for an inconsistent plan.
    pub fn installment_share(&self) -> Percent {
        Decimal::ONE_HUNDRED
            - self.down_payment_percentage
            - self.handover_payment_percentage
            - self.post_handover_share()
    }

    pub fn has_post_handover(&self) -> bool {
        self.post_handover_share() > Decimal::ZERO && self.post_handover_months.unwrap_or(0) > 0
    }
}

// ---------------------------------------------------------------------------
// Mortgage plans
// ---------------------------------------------------------------------------

/// A bank mortgage product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgagePlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub down_payment_percentage: Percent,
    /// Annual interest rate
    pub interest_rate: Percent,
    pub term_years: u32,
    pub max_loan_amount: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn plan(down: Decimal, handover: Decimal, post: Option<Decimal>) -> PaymentPlan {
        PaymentPlan {
            name: "t".into(),
            description: String::new(),
            down_payment_percentage: down,
            handover_payment_percentage: handover,
            installment_months: 24,
            installment_frequency: InstallmentFrequency::Monthly,
            post_handover_months: post.map(|_| 12),
            post_handover_percentage: post,
        }
    }

    #[test]
    fn test_quarterly_count_rounds_up() {
        assert_eq!(InstallmentFrequency::Quarterly.installment_count(24), 8);
        assert_eq!(InstallmentFrequency::Quarterly.installment_count(18), 6);
        assert_eq!(InstallmentFrequency::Quarterly.installment_count(19), 7);
        assert_eq!(InstallmentFrequency::Monthly.installment_count(19), 19);
        assert_eq!(InstallmentFrequency::Quarterly.installment_count(0), 0);
    }

    #[test]
    fn test_installment_share_subtracts_post_handover() {
        assert_eq!(plan(dec!(40), dec!(60), None).installment_share(), dec!(0));
        assert_eq!(plan(dec!(25), dec!(10), None).installment_share(), dec!(65));
        assert_eq!(
            plan(dec!(35), dec!(45), Some(dec!(20))).installment_share(),
            dec!(0)
        );
        assert_eq!(
            plan(dec!(20), dec!(30), Some(dec!(50))).installment_share(),
            dec!(0)
        );
    }

    #[test]
    fn test_deserialize_minimal_plan() {
        let json = r#"{
            "name": "Custom",
            "down_payment_percentage": "10",
            "handover_payment_percentage": "90"
        }"#;
        let p: PaymentPlan = serde_json::from_str(json).unwrap();
        assert_eq!(p.installment_months, 0);
        assert_eq!(p.installment_frequency, InstallmentFrequency::Monthly);
        assert!(!p.has_post_handover());
    }
}
