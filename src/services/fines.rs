//! Fine calculation

use rust_decimal::Decimal;

use crate::{
    config::FineConfig,
    models::{DamageRate, NewDamageReport},
};

/// Computes overdue and damage fines
#[cfg_attr(test, mockall::automock)]
pub trait FineCalculator: Send + Sync {
    /// Fine for keeping a book `days_borrowed` days
    fn overdue_fine(&self, days_borrowed: i64) -> Decimal;

    /// Sum of the damage fines for `damages` on a book worth `book_price`.
    /// Not capped; capping to the book price is up to the caller.
    fn damage_fine(&self, damages: &[NewDamageReport], book_price: Decimal) -> Decimal;
}

/// Share of the book price charged for a damage of the given rate
pub fn damage_multiplier(rate: DamageRate) -> Decimal {
    match rate {
        DamageRate::Light => Decimal::new(1, 1),
        DamageRate::Medium => Decimal::new(5, 1),
        DamageRate::Critical => Decimal::new(7, 1),
        DamageRate::Lost => Decimal::ONE,
    }
}

/// Library fine policy: a free loan period, then a flat daily rate
#[derive(Debug, Clone)]
pub struct FineService {
    loan_period_days: i64,
    daily_rate: Decimal,
}

impl FineService {
    pub fn new(config: &FineConfig) -> Self {
        Self {
            loan_period_days: config.loan_period_days,
            daily_rate: config.daily_rate,
        }
    }
}

impl Default for FineService {
    fn default() -> Self {
        Self::new(&FineConfig::default())
    }
}

impl FineCalculator for FineService {
    fn overdue_fine(&self, days_borrowed: i64) -> Decimal {
        if days_borrowed <= self.loan_period_days {
            return Decimal::ZERO;
        }
        Decimal::from(days_borrowed - self.loan_period_days) * self.daily_rate
    }

    fn damage_fine(&self, damages: &[NewDamageReport], book_price: Decimal) -> Decimal {
        damages
            .iter()
            .map(|d| damage_multiplier(d.rate) * book_price)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn damage(rate: DamageRate) -> NewDamageReport {
        NewDamageReport {
            book_id: 1,
            description: format!("{} damage", rate),
            rate,
            date_reported: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        }
    }

    #[test]
    fn test_no_overdue_fine_within_loan_period() {
        let fines = FineService::default();
        for days in 0..=14 {
            assert_eq!(fines.overdue_fine(days), Decimal::ZERO, "days = {}", days);
        }
    }

    #[test]
    fn test_overdue_fine_per_extra_day() {
        let fines = FineService::default();
        assert_eq!(fines.overdue_fine(15), Decimal::new(5, 1));
        assert_eq!(fines.overdue_fine(20), Decimal::new(3, 0));
    }

    #[test]
    fn test_configured_policy() {
        let fines = FineService::new(&FineConfig {
            loan_period_days: 7,
            daily_rate: Decimal::new(2, 0),
        });
        assert_eq!(fines.overdue_fine(7), Decimal::ZERO);
        assert_eq!(fines.overdue_fine(10), Decimal::new(6, 0));
    }

    #[test]
    fn test_single_damage_per_rate() {
        let fines = FineService::default();
        let price = Decimal::new(300, 0);
        let expected = [
            (DamageRate::Light, Decimal::new(30, 0)),
            (DamageRate::Medium, Decimal::new(150, 0)),
            (DamageRate::Critical, Decimal::new(210, 0)),
            (DamageRate::Lost, Decimal::new(300, 0)),
        ];
        for (rate, fine) in expected {
            assert_eq!(fines.damage_fine(&[damage(rate)], price), fine, "{}", rate);
        }
    }

    #[test]
    fn test_damage_fines_add_up_uncapped() {
        let fines = FineService::default();
        let damages = [damage(DamageRate::Critical), damage(DamageRate::Medium)];
        assert_eq!(fines.damage_fine(&damages, Decimal::new(100, 0)), Decimal::new(120, 0));
    }

    #[test]
    fn test_no_damages_no_fine() {
        let fines = FineService::default();
        assert_eq!(fines.damage_fine(&[], Decimal::new(100, 0)), Decimal::ZERO);
    }
}
