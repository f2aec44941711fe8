// Room search pipeline: filter a room list by type and price band, then order it
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::model::{Room, RoomType};

// Inclusive price interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

impl PriceBand {
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        let band = Self { min, max };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ValidationError::InvalidFilter(format!(
                "price band bounds must be numeric, got {} to {}",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(ValidationError::InvalidFilter(format!(
                "price band minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$ {} to {}", self.min, self.max)
    }
}

// Accepts the checkbox labels shown to guests, e.g. "$ 500 to 1000" or "500 to 1000"
impl FromStr for PriceBand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim().trim_start_matches('$').trim();
        let (min, max) = body.split_once(" to ").ok_or_else(|| {
            ValidationError::InvalidFilter(format!("price band '{}' is not of the form 'min to max'", s))
        })?;

        let parse_bound = |raw: &str| {
            raw.trim().parse::<f64>().map_err(|_| {
                ValidationError::InvalidFilter(format!(
                    "price band '{}' has a non-numeric bound '{}'",
                    s,
                    raw.trim()
                ))
            })
        };

        PriceBand::new(parse_bound(min)?, parse_bound(max)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SortOption {
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "newest-first")]
    NewestFirst,
}

impl FromStr for SortOption {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price-asc" | "Price Low to High" => Ok(SortOption::PriceAsc),
            "price-desc" | "Price High to Low" => Ok(SortOption::PriceDesc),
            "newest-first" | "Newest First" => Ok(SortOption::NewestFirst),
            other => Err(ValidationError::InvalidFilter(format!(
                "unknown sort option '{}'",
                other
            ))),
        }
    }
}

/// Selections for one search. `None` on an axis means "no restriction";
/// `Some` of an empty set means the guest deselected everything and nothing
/// matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub room_types: Option<HashSet<RoomType>>,
    pub price_ranges: Option<Vec<PriceBand>>,
    pub sort_option: Option<SortOption>,
    pub available_only: bool,
}

impl FilterCriteria {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(bands) = &self.price_ranges {
            for band in bands {
                band.validate()?;
            }
        }
        Ok(())
    }

    pub fn matches(&self, room: &Room) -> bool {
        if self.available_only && !room.is_available {
            return false;
        }

        if !self
            .room_types
            .as_ref()
            .map_or(true, |types| types.contains(&room.room_type))
        {
            return false;
        }

        self.price_ranges.as_ref().map_or(true, |bands| {
            bands.iter().any(|band| band.contains(room.price_per_night))
        })
    }
}

/// Raw selections as they arrive from the presentation layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchQuery {
    pub room_types: Option<Vec<String>>,
    pub price_ranges: Option<Vec<String>>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub available_only: bool,
}

impl SearchQuery {
    pub fn into_criteria(self) -> Result<FilterCriteria, ValidationError> {
        let room_types = self
            .room_types
            .map(|types| {
                types
                    .iter()
                    .map(|t| t.parse::<RoomType>())
                    .collect::<Result<HashSet<_>, _>>()
            })
            .transpose()?;

        let price_ranges = self
            .price_ranges
            .map(|bands| {
                bands
                    .iter()
                    .map(|b| b.parse::<PriceBand>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        // An unselected radio group arrives as an empty string
        let sort_option = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => Some(label.parse::<SortOption>()?),
        };

        Ok(FilterCriteria {
            room_types,
            price_ranges,
            sort_option,
            available_only: self.available_only,
        })
    }
}

/// Runs the filter and sort pipeline over `rooms` without touching the input.
pub fn search(rooms: &[Room], criteria: &FilterCriteria) -> Result<Vec<Room>, ValidationError> {
    criteria.validate()?;

    let mut results: Vec<Room> = rooms
        .iter()
        .filter(|room| criteria.matches(room))
        .cloned()
        .collect();

    // sort_by is stable, so ties keep their input order
    match criteria.sort_option {
        Some(SortOption::PriceAsc) => {
            results.sort_by(|a, b| a.price_per_night.total_cmp(&b.price_per_night))
        }
        Some(SortOption::PriceDesc) => {
            results.sort_by(|a, b| b.price_per_night.total_cmp(&a.price_per_night))
        }
        Some(SortOption::NewestFirst) => results.sort_by(newest_first),
        None => {}
    }

    Ok(results)
}

fn newest_first(a: &Room, b: &Room) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
