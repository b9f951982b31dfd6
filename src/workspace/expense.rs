use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notes marker stamped on every occurrence the materializer creates.
pub const GENERATED_NOTE: &str = "Auto-generated from recurring schedule";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    Transfer,
    Card,
    Cash,
    DirectDebit,
}

impl PaymentMethod {
    pub fn parse(token: &str) -> Option<PaymentMethod> {
        match token.to_lowercase().as_str() {
            "transfer" | "wire" => Some(PaymentMethod::Transfer),
            "card" | "credit" => Some(PaymentMethod::Card),
            "cash" => Some(PaymentMethod::Cash),
            "debit" | "direct-debit" => Some(PaymentMethod::DirectDebit),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Transfer => "Transfer",
            PaymentMethod::Card => "Card",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::DirectDebit => "Direct debit",
        }
    }
}

/// Billing cycle of a recurring expense template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Frequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Frequency {
    /// Parses a frequency token, returning `None` for unrecognized input.
    pub fn parse(token: &str) -> Option<Frequency> {
        match token.to_lowercase().as_str() {
            "weekly" | "week" => Some(Frequency::Weekly),
            "biweekly" | "fortnightly" => Some(Frequency::Biweekly),
            "monthly" | "month" => Some(Frequency::Monthly),
            "quarterly" | "quarter" => Some(Frequency::Quarterly),
            "semiannual" | "semiannually" | "half-yearly" => Some(Frequency::Semiannual),
            "annual" | "annually" | "yearly" => Some(Frequency::Annual),
            _ => None,
        }
    }

    /// Parses a frequency token; unrecognized input falls back to monthly.
    pub fn parse_or_monthly(token: &str) -> Frequency {
        Self::parse(token).unwrap_or_default()
    }

    pub fn next_date(&self, from: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Weekly => from + Duration::weeks(1),
            Frequency::Biweekly => from + Duration::weeks(2),
            Frequency::Monthly => shift_month(from, 1),
            Frequency::Quarterly => shift_month(from, 3),
            Frequency::Semiannual => shift_month(from, 6),
            Frequency::Annual => shift_month(from, 12),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Biweekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Semiannual => "Semiannual",
            Frequency::Annual => "Annual",
        }
    }
}

/// Recurrence rule attached to an expense template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recurrence {
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub frequency: Frequency,
}

impl Recurrence {
    pub fn new(start_date: NaiveDate, frequency: Frequency) -> Self {
        Self {
            start_date,
            end_date: None,
            frequency,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

/// An expense row. With a recurrence rule it is a template that only seeds
/// the materializer; without one it is a concrete payable occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub unit_value: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub recurrence: Option<Recurrence>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        payment_date: NaiveDate,
        payment_method: PaymentMethod,
        unit_value: f64,
        quantity: u32,
        created_by: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            payment_date,
            payment_method,
            unit_value,
            quantity,
            notes: None,
            recurrence: None,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.payment_date = recurrence.start_date;
        self.recurrence = Some(recurrence);
        self
    }

    pub fn amount(&self) -> f64 {
        self.unit_value * f64::from(self.quantity)
    }

    pub fn is_template(&self) -> bool {
        self.recurrence.is_some()
    }
}

fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn frequency_stepping_matches_billing_cycles() {
        let start = date(2024, 1, 15);
        assert_eq!(Frequency::Weekly.next_date(start), date(2024, 1, 22));
        assert_eq!(Frequency::Biweekly.next_date(start), date(2024, 1, 29));
        assert_eq!(Frequency::Monthly.next_date(start), date(2024, 2, 15));
        assert_eq!(Frequency::Quarterly.next_date(start), date(2024, 4, 15));
        assert_eq!(Frequency::Semiannual.next_date(start), date(2024, 7, 15));
        assert_eq!(Frequency::Annual.next_date(start), date(2025, 1, 15));
    }

    #[test]
    fn month_stepping_clamps_to_month_length() {
        assert_eq!(Frequency::Monthly.next_date(date(2024, 1, 31)), date(2024, 2, 29));
        assert_eq!(Frequency::Monthly.next_date(date(2023, 1, 31)), date(2023, 2, 28));
        assert_eq!(Frequency::Quarterly.next_date(date(2024, 11, 30)), date(2025, 2, 28));
    }

    #[test]
    fn unrecognized_frequency_defaults_to_monthly() {
        assert_eq!(Frequency::parse("weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("every-other-day"), None);
        assert_eq!(Frequency::parse_or_monthly("every-other-day"), Frequency::Monthly);
    }

    #[test]
    fn amount_multiplies_unit_value_by_quantity() {
        let expense = Expense::new(
            "Licenses",
            "Software",
            date(2024, 3, 1),
            PaymentMethod::Card,
            49.9,
            3,
            Uuid::new_v4(),
        );
        assert!((expense.amount() - 149.7).abs() < 1e-9);
    }
}
