//! Built-in payment and mortgage plan catalogs.
//!
//! These are configuration data handed to the engine by a caller. The
//! schedule engine itself only ever sees a fully resolved plan.

use rust_decimal_macros::dec;

use crate::plans::{InstallmentFrequency, MortgagePlan, PaymentPlan};

fn installment_plan(
    name: &str,
    description: &str,
    down: rust_decimal::Decimal,
    handover: rust_decimal::Decimal,
    installment_months: u32,
    installment_frequency: InstallmentFrequency,
) -> PaymentPlan {
    PaymentPlan {
        name: name.into(),
        description: description.into(),
        down_payment_percentage: down,
        handover_payment_percentage: handover,
        installment_months,
        installment_frequency,
        post_handover_months: None,
        post_handover_percentage: None,
    }
}

fn with_post_handover(
    mut plan: PaymentPlan,
    months: u32,
    percentage: rust_decimal::Decimal,
) -> PaymentPlan {
    plan.post_handover_months = Some(months);
    plan.post_handover_percentage = Some(percentage);
    plan
}

/// Developer payment plans offered by default.
pub fn default_payment_plans() -> Vec<PaymentPlan> {
    use InstallmentFrequency::{Monthly, Quarterly};

    vec![
        installment_plan(
            "Standard",
            "20% down payment, 80% on handover",
            dec!(20),
            dec!(80),
            0,
            Monthly,
        ),
        installment_plan(
            "40/60",
            "40% down payment, 60% in installments until completion",
            dec!(40),
            dec!(60),
            24,
            Monthly,
        ),
        installment_plan(
            "50/50",
            "50% down payment, 50% on handover",
            dec!(50),
            dec!(50),
            0,
            Monthly,
        ),
        installment_plan(
            "Extended",
            "30% down payment, quarterly installments, 40% on handover",
            dec!(30),
            dec!(40),
            24,
            Quarterly,
        ),
        with_post_handover(
            installment_plan(
                "Post-handover",
                "20% down payment, 30% before handover, 50% over 2 years after handover",
                dec!(20),
                dec!(30),
                24,
                Monthly,
            ),
            24,
            dec!(50),
        ),
        installment_plan(
            "10/90",
            "10% down payment, 90% on handover (ready projects)",
            dec!(10),
            dec!(90),
            0,
            Monthly,
        ),
        installment_plan(
            "25/75 with installments",
            "25% down payment, 65% in installments, 10% on handover",
            dec!(25),
            dec!(10),
            36,
            Monthly,
        ),
        with_post_handover(
            installment_plan(
                "60/40 post-handover",
                "20% down payment, 40% before handover, 40% over 3 years after handover",
                dec!(20),
                dec!(40),
                24,
                Monthly,
            ),
            36,
            dec!(40),
        ),
        with_post_handover(
            installment_plan(
                "Premium",
                "30% down payment, 30% in installments, 20% on handover, 20% a year after handover",
                dec!(30),
                dec!(20),
                18,
                Quarterly,
            ),
            12,
            dec!(20),
        ),
        with_post_handover(
            installment_plan(
                "Investor",
                "35% down payment, 45% before handover, 20% within a year after handover",
                dec!(35),
                dec!(45),
                24,
                Monthly,
            ),
            12,
            dec!(20),
        ),
    ]
}

/// Bank mortgage products offered by default.
pub fn default_mortgage_plans() -> Vec<MortgagePlan> {
    vec![
        MortgagePlan {
            name: "Standard mortgage".into(),
            description: "20% down payment, 4.49% p.a., up to 25 years".into(),
            down_payment_percentage: dec!(20),
            interest_rate: dec!(4.49),
            term_years: 25,
            max_loan_amount: dec!(15000000),
        },
        MortgagePlan {
            name: "Special programme".into(),
            description: "30% down payment, 3.99% p.a., up to 20 years".into(),
            down_payment_percentage: dec!(30),
            interest_rate: dec!(3.99),
            term_years: 20,
            max_loan_amount: dec!(10000000),
        },
        MortgagePlan {
            name: "Premium mortgage".into(),
            description: "25% down payment, 4.29% p.a., up to 30 years".into(),
            down_payment_percentage: dec!(25),
            interest_rate: dec!(4.29),
            term_years: 30,
            max_loan_amount: dec!(20000000),
        },
    ]
}

/// Resolve a plan by exact name (case-insensitive) or by zero-based index.
pub fn find_plan<'a>(plans: &'a [PaymentPlan], key: &str) -> Option<&'a PaymentPlan> {
    if let Ok(idx) = key.trim().parse::<usize>() {
        return plans.get(idx);
    }
    plans.iter().find(|p| p.name.eq_ignore_ascii_case(key.trim()))
}

pub fn find_mortgage_plan<'a>(plans: &'a [MortgagePlan], key: &str) -> Option<&'a MortgagePlan> {
    if let Ok(idx) = key.trim().parse::<usize>() {
        return plans.get(idx);
    }
    plans.iter().find(|p| p.name.eq_ignore_ascii_case(key.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(default_payment_plans().len(), 10);
        assert_eq!(default_mortgage_plans().len(), 3);
    }

    #[test]
    fn test_plans_without_post_handover_sum_to_100_or_have_installments() {
        for plan in default_payment_plans() {
            let share = plan.installment_share();
            assert!(share >= Decimal::ZERO, "{} has negative share", plan.name);
            if plan.installment_months == 0 {
                assert_eq!(share, Decimal::ZERO, "{}", plan.name);
            }
        }
    }

    #[test]
    fn test_find_plan_by_name_and_index() {
        let plans = default_payment_plans();
        assert_eq!(find_plan(&plans, "50/50").unwrap().name, "50/50");
        assert_eq!(find_plan(&plans, "standard").unwrap().name, "Standard");
        assert_eq!(find_plan(&plans, "3").unwrap().name, "Extended");
        assert!(find_plan(&plans, "nope").is_none());
        assert!(find_plan(&plans, "99").is_none());
    }

    #[test]
    fn test_find_mortgage_plan() {
        let plans = default_mortgage_plans();
        assert_eq!(
            find_mortgage_plan(&plans, "premium mortgage").unwrap().term_years,
            30
        );
    }
}
