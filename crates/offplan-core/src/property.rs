use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::convert_amount;
use crate::plans::{MortgagePlan, PaymentPlan};
use crate::types::{round_money, Currency, Money, Percent};
use crate::OffplanResult;

/// A deposit or other side asset whose interest offsets payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetIncome {
    pub initial_amount: Money,
    /// Annual rate, compounded monthly
    pub apr: Percent,
    #[serde(default)]
    pub currency: Currency,
}

/// Rent collected once the project is handed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalIncome {
    pub monthly_amount: Money,
    #[serde(default)]
    pub currency: Currency,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Installment,
    Mortgage,
}

/// Full input to the schedule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub price: Money,
    /// Purchase date; the down payment is dated here and installments count
    /// from it
    pub start_date: NaiveDate,
    /// Project completion (handover) date
    pub completion_date: NaiveDate,
    /// Horizon of the monthly simulation
    pub end_date: NaiveDate,
    pub selected_plan: PaymentPlan,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_income: Option<AssetIncome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_income: Option<RentalIncome>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_mortgage_plan: Option<MortgagePlan>,
    /// Overrides the mortgage plan's annual rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_mortgage_rate: Option<Percent>,

    /// Share of the 4% DLD transfer fee paid by the buyer, 0-4
    #[serde(default)]
    pub dld_buyer_percentage: Percent,
    #[serde(default)]
    pub realtor_commission: Percent,
    /// Percent of the loan
    #[serde(default)]
    pub mortgage_setup_fee: Percent,
    /// Percent of the loan
    #[serde(default)]
    pub mortgage_registration_fee: Percent,
    #[serde(default)]
    pub valuation_fee: Money,
    #[serde(default)]
    pub no_objection_certificate: Money,
    #[serde(default)]
    pub title_deed_fee: Money,
    #[serde(default)]
    pub administrative_fees: Money,

    /// Generate post-handover installment events instead of only reporting
    /// the unscheduled share
    #[serde(default)]
    pub schedule_post_handover: bool,
    /// Fold any rounding/percentage discrepancy into the last payment so the
    /// contractual total equals the price
    #[serde(default)]
    pub reconcile_to_price: bool,
}

impl PropertyDetails {
    /// Minimal record with no side income and no fees.
    pub fn new(
        price: Money,
        start_date: NaiveDate,
        completion_date: NaiveDate,
        end_date: NaiveDate,
        selected_plan: PaymentPlan,
    ) -> Self {
        Self {
            price,
            start_date,
            completion_date,
            end_date,
            selected_plan,
            currency: Currency::default(),
            asset_income: None,
            rental_income: None,
            payment_method: PaymentMethod::default(),
            selected_mortgage_plan: None,
            custom_mortgage_rate: None,
            dld_buyer_percentage: Decimal::ZERO,
            realtor_commission: Decimal::ZERO,
            mortgage_setup_fee: Decimal::ZERO,
            mortgage_registration_fee: Decimal::ZERO,
            valuation_fee: Decimal::ZERO,
            no_objection_certificate: Decimal::ZERO,
            title_deed_fee: Decimal::ZERO,
            administrative_fees: Decimal::ZERO,
            schedule_post_handover: false,
            reconcile_to_price: false,
        }
    }

    /// Switch the display currency, converting the price and the asset's
    /// initial amount at the fixed rates and rounding to whole units.
    ///
    /// Rates are not exact inverses, so AED -> USD -> AED does not return
    /// the original price.
    pub fn converted_to(&self, currency: Currency) -> OffplanResult<Self> {
        if currency == self.currency {
            return Ok(self.clone());
        }
        let mut out = self.clone();
        out.price = round_money(convert_amount(self.price, self.currency, currency)?);
        if let Some(asset) = out.asset_income.as_mut() {
            asset.initial_amount =
                round_money(convert_amount(asset.initial_amount, self.currency, currency)?);
            asset.currency = currency;
        }
        out.currency = currency;
        Ok(out)
    }
}
