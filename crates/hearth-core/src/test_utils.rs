//! Test utilities: transaction record builders and a fixed-width measurer
//!
//! Used by unit tests in this crate and, through the `test-utils` feature,
//! by the CLI and server test suites.

use chrono::NaiveDate;

use crate::layout::{Font, TextMeasure};
use crate::models::{
    BuildingRef, MonthlyRent, PropertyRef, RecordState, RentPayment, RentalRef, ServiceRef,
    TransactionKind, TransactionRecord,
};

/// Builder for [`TransactionRecord`] fixtures
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: TransactionRecord,
}

impl RecordBuilder {
    pub fn income(id: &str, date: &str, amount: f64) -> Self {
        Self::new(id, date, amount, TransactionKind::Income { payment: None })
    }

    pub fn expense(id: &str, date: &str, amount: f64) -> Self {
        Self::new(
            id,
            date,
            amount,
            TransactionKind::Expense {
                building: None,
                property: None,
                service: None,
            },
        )
    }

    fn new(id: &str, date: &str, amount: f64, kind: TransactionKind) -> Self {
        Self {
            record: TransactionRecord {
                id: id.to_string(),
                date: parse_date(date),
                amount,
                category: None,
                description: None,
                state: RecordState::Active,
                kind,
            },
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.record.category = Some(category.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.record.description = Some(description.to_string());
        self
    }

    pub fn voided(mut self) -> Self {
        self.record.state = RecordState::Voided;
        self
    }

    /// Attach a complete payment chain (income only)
    pub fn rental(mut self, rental_id: &str, property_id: &str, building_id: Option<&str>) -> Self {
        if let TransactionKind::Income { payment } = &mut self.record.kind {
            *payment = Some(RentPayment {
                monthly_rent: Some(MonthlyRent {
                    id: format!("mr-{}", self.record.id),
                    period: None,
                    rental: Some(RentalRef {
                        id: rental_id.to_string(),
                        label: None,
                        property: Some(property(property_id, building_id)),
                    }),
                }),
            });
        }
        self
    }

    /// Direct building reference (expense only)
    pub fn building(mut self, building_id: &str) -> Self {
        if let TransactionKind::Expense { building, .. } = &mut self.record.kind {
            *building = Some(BuildingRef {
                id: building_id.to_string(),
                name: None,
            });
        }
        self
    }

    /// Property reference (expense only)
    pub fn property(mut self, property_id: &str, building_id: Option<&str>) -> Self {
        if let TransactionKind::Expense { property: p, .. } = &mut self.record.kind {
            *p = Some(property(property_id, building_id));
        }
        self
    }

    /// Service reference (expense only)
    pub fn service(mut self, service_id: &str, name: &str) -> Self {
        if let TransactionKind::Expense { service, .. } = &mut self.record.kind {
            *service = Some(ServiceRef {
                id: service_id.to_string(),
                name: Some(name.to_string()),
            });
        }
        self
    }

    pub fn build(self) -> TransactionRecord {
        self.record
    }
}

/// Shorthand for [`RecordBuilder::income`]
pub fn income(id: &str, date: &str, amount: f64) -> RecordBuilder {
    RecordBuilder::income(id, date, amount)
}

/// Shorthand for [`RecordBuilder::expense`]
pub fn expense(id: &str, date: &str, amount: f64) -> RecordBuilder {
    RecordBuilder::expense(id, date, amount)
}

pub fn parse_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("test date must be YYYY-MM-DD")
}

fn property(property_id: &str, building_id: Option<&str>) -> PropertyRef {
    PropertyRef {
        id: property_id.to_string(),
        name: None,
        building: building_id.map(|id| BuildingRef {
            id: id.to_string(),
            name: None,
        }),
    }
}

/// Every character is `char_width` points wide regardless of font and size
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasure {
    pub char_width: f32,
}

impl FixedWidthMeasure {
    pub fn new(char_width: f32) -> Self {
        Self { char_width }
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn width(&self, text: &str, _font: Font, _size: f32) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}
