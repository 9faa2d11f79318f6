//! Relationship resolution for entity rollups
//!
//! Income is tied to the portfolio only through the payment chain
//! (payment → monthly rent → rental → property → building). Expenses can
//! reference a building directly, a property (which may sit in a building),
//! and/or a service. Every rollup dimension goes through [`resolve`], so the
//! precedence rules live here and nowhere else.

use serde::{Deserialize, Serialize};

use crate::models::{BuildingRef, PropertyRef, RentalRef, TransactionKind, TransactionRecord};

/// Label used when a record has no category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Grouping dimension for entity rollups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Building,
    Property,
    Service,
    Rental,
    Category,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Property => "property",
            Self::Service => "service",
            Self::Rental => "rental",
            Self::Category => "category",
        }
    }

    /// Column/heading label for reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Building => "Building",
            Self::Property => "Property",
            Self::Service => "Service",
            Self::Rental => "Rental",
            Self::Category => "Category",
        }
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "building" | "buildings" => Ok(Self::Building),
            "property" | "properties" => Ok(Self::Property),
            "service" | "services" => Ok(Self::Service),
            "rental" | "rentals" => Ok(Self::Rental),
            "category" | "categories" => Ok(Self::Category),
            _ => Err(format!(
                "Unknown dimension: {} (valid: building, property, service, rental, category)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a rollup group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub id: String,
    pub label: String,
}

impl EntityKey {
    pub fn new(id: impl Into<String>, label: Option<&str>) -> Self {
        let id = id.into();
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| id.clone());
        Self { id, label }
    }
}

/// Resolve the group a record belongs to along `dimension`
///
/// `None` means the record is unattributed for that dimension; it still
/// counts toward global totals.
pub fn resolve(record: &TransactionRecord, dimension: Dimension) -> Option<EntityKey> {
    match dimension {
        Dimension::Building => building_of(record)
            .map(|b| EntityKey::new(b.id.clone(), b.name.as_deref())),
        Dimension::Property => property_of(record)
            .map(|p| EntityKey::new(p.id.clone(), p.name.as_deref())),
        Dimension::Service => match &record.kind {
            TransactionKind::Expense {
                service: Some(service),
                ..
            } => Some(EntityKey::new(service.id.clone(), service.name.as_deref())),
            _ => None,
        },
        Dimension::Rental => {
            rental_of(record).map(|r| EntityKey::new(r.id.clone(), r.label.as_deref()))
        }
        Dimension::Category => {
            let category = record
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(UNCATEGORIZED);
            Some(EntityKey::new(category, Some(category)))
        }
    }
}

/// Building a record is attributed to
///
/// Income: only through a complete payment chain. Expense: a direct building
/// reference wins, then the property's building.
pub fn building_of(record: &TransactionRecord) -> Option<&BuildingRef> {
    match &record.kind {
        TransactionKind::Income { .. } => rental_of(record)
            .and_then(|rental| rental.property.as_ref())
            .and_then(|property| property.building.as_ref()),
        TransactionKind::Expense {
            building, property, ..
        } => building
            .as_ref()
            .or_else(|| property.as_ref().and_then(|p| p.building.as_ref())),
    }
}

/// Property a record is attributed to
pub fn property_of(record: &TransactionRecord) -> Option<&PropertyRef> {
    match &record.kind {
        TransactionKind::Income { .. } => {
            rental_of(record).and_then(|rental| rental.property.as_ref())
        }
        TransactionKind::Expense { property, .. } => property.as_ref(),
    }
}

/// Rental an income record pays for; expenses never resolve to a rental
pub fn rental_of(record: &TransactionRecord) -> Option<&RentalRef> {
    match &record.kind {
        TransactionKind::Income { payment } => payment
            .as_ref()
            .and_then(|p| p.monthly_rent.as_ref())
            .and_then(|rent| rent.rental.as_ref()),
        TransactionKind::Expense { .. } => None,
    }
}
