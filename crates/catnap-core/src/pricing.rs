//! # Price Calculator
//!
//! Computes what a booking costs from the room rate, the stay length and the
//! requested service and food lines.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  room_price     = room.price_per_day × nights                          │
//! │  services_price = Σ catalog(service).price × max(quantity, 1)          │
//! │  food_price     = Σ catalog(food).price    × max(quantity, 1)          │
//! │  total          = room_price + services_price + food_price             │
//! │                                                                         │
//! │  Any missing or inactive catalog id aborts the whole quote with an     │
//! │  error naming that id. Nothing is partially priced.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices come from a [`CatalogSnapshot`] the caller loads for the current
//! request (inside its unit of work). Snapshots are never shared between
//! requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, EntityKind, ValidationError};
use crate::money::Money;
use crate::types::{FoodItem, FoodRequest, Room, Service, ServiceRequest};

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// Catalog read result: `{id, price, is_active}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub price: Money,
    pub is_active: bool,
}

impl From<&Service> for CatalogEntry {
    fn from(s: &Service) -> Self {
        CatalogEntry {
            id: s.id.clone(),
            price: s.price(),
            is_active: s.is_active,
        }
    }
}

impl From<&FoodItem> for CatalogEntry {
    fn from(f: &FoodItem) -> Self {
        CatalogEntry {
            id: f.id.clone(),
            price: f.price(),
            is_active: f.is_active,
        }
    }
}

/// Service and food prices read for one request.
///
/// Ids that were looked up and not found are simply absent.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    services: HashMap<String, CatalogEntry>,
    food: HashMap<String, CatalogEntry>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_service(&mut self, entry: CatalogEntry) {
        self.services.insert(entry.id.clone(), entry);
    }

    pub fn insert_food(&mut self, entry: CatalogEntry) {
        self.food.insert(entry.id.clone(), entry);
    }

    pub fn with_service(mut self, entry: CatalogEntry) -> Self {
        self.insert_service(entry);
        self
    }

    pub fn with_food(mut self, entry: CatalogEntry) -> Self {
        self.insert_food(entry);
        self
    }

    fn service(&self, id: &str) -> Option<&CatalogEntry> {
        self.services.get(id)
    }

    fn food(&self, id: &str) -> Option<&CatalogEntry> {
        self.food.get(id)
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A priced line. `index` points back into the request list it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub index: usize,
    pub item_id: String,
    /// Quantity after clamping to at least 1.
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// The four prices stored on a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    pub room: Money,
    pub services: Money,
    pub food: Money,
    pub total: Money,
}

/// Full result of a price calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub breakdown: PriceBreakdown,
    pub nights: i64,
    pub services: Vec<PricedLine>,
    pub food: Vec<PricedLine>,
}

// =============================================================================
// Calculation
// =============================================================================

/// Prices a stay.
///
/// ## Example
/// ```rust
/// use catnap_core::money::Money;
/// use catnap_core::pricing::{compute_price, CatalogEntry, CatalogSnapshot};
/// use catnap_core::types::{FoodRequest, Room, ServiceRequest};
/// use chrono::Utc;
///
/// let room = Room {
///     id: "room-1".into(),
///     name: "Sunny Loft".into(),
///     price_per_day_cents: 2000,
///     capacity: 1,
///     is_available: true,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
/// let catalog = CatalogSnapshot::new()
///     .with_service(CatalogEntry { id: "groom".into(), price: Money::from_cents(1000), is_active: true })
///     .with_food(CatalogEntry { id: "tuna".into(), price: Money::from_cents(500), is_active: true });
///
/// let quote = compute_price(
///     &room,
///     3,
///     &[ServiceRequest::new("groom", 2)],
///     &[FoodRequest::new("tuna", 1)],
///     &catalog,
/// )
/// .unwrap();
///
/// assert_eq!(quote.breakdown.total, Money::from_cents(8500));
/// ```
pub fn compute_price(
    room: &Room,
    nights: i64,
    services: &[ServiceRequest],
    food: &[FoodRequest],
    catalog: &CatalogSnapshot,
) -> CoreResult<PriceQuote> {
    if nights <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "nights".to_string(),
        }
        .into());
    }

    let room_price = room
        .price_per_day()
        .checked_multiply(nights)
        .ok_or_else(|| overflow("room_price"))?;

    let service_lines = services
        .iter()
        .enumerate()
        .map(|(index, req)| {
            let entry = lookup(catalog.service(&req.service_id), EntityKind::Service, &req.service_id)?;
            price_line(index, entry, req.quantity)
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let food_lines = food
        .iter()
        .enumerate()
        .map(|(index, req)| {
            let entry = lookup(catalog.food(&req.food_id), EntityKind::Food, &req.food_id)?;
            price_line(index, entry, req.quantity)
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let services_price = Money::checked_sum(service_lines.iter().map(|l| l.line_total))
        .ok_or_else(|| overflow("services_price"))?;
    let food_price = Money::checked_sum(food_lines.iter().map(|l| l.line_total))
        .ok_or_else(|| overflow("food_price"))?;
    let total = Money::checked_sum([room_price, services_price, food_price])
        .ok_or_else(|| overflow("total"))?;

    Ok(PriceQuote {
        breakdown: PriceBreakdown {
            room: room_price,
            services: services_price,
            food: food_price,
            total,
        },
        nights,
        services: service_lines,
        food: food_lines,
    })
}

fn lookup<'a>(
    entry: Option<&'a CatalogEntry>,
    entity: EntityKind,
    id: &str,
) -> CoreResult<&'a CatalogEntry> {
    match entry {
        None => Err(CoreError::not_found(entity, id)),
        Some(e) if !e.is_active => Err(CoreError::inactive(entity, id)),
        Some(e) => Ok(e),
    }
}

fn price_line(index: usize, entry: &CatalogEntry, quantity: i64) -> CoreResult<PricedLine> {
    let quantity = quantity.max(1);
    let line_total = entry
        .price
        .checked_multiply(quantity)
        .ok_or_else(|| overflow("line_total"))?;

    Ok(PricedLine {
        index,
        item_id: entry.id.clone(),
        quantity,
        unit_price: entry.price,
        line_total,
    })
}

fn overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
