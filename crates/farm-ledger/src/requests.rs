//! Request payloads and their validation.
//!
//! Payload structs mirror the JSON bodies sent by the browser client: every
//! field is optional so that a missing field becomes a validation error with
//! a readable message instead of a deserialization failure. `validate`
//! produces the checked input the ledgers work with.

use farm_types::{amount, CalendarDate, RecordId};
use serde::Deserialize;

use crate::error::{LedgerError, LedgerResult};

const ALL_FIELDS_REQUIRED: &str = "All Fields are required.";

fn required_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn non_negative(value: f64, field: &str) -> LedgerResult<f64> {
    if value < 0.0 {
        return Err(LedgerError::validation(format!("{field} cannot be negative.")));
    }
    Ok(value)
}

/// Body of `POST /feedStock/addFeedStock`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPurchase {
    #[serde(default)]
    pub feed_type: Option<String>,
    #[serde(default, deserialize_with = "amount::deserialize_opt")]
    pub purchase_weight: Option<f64>,
    #[serde(default, deserialize_with = "amount::deserialize_opt")]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<CalendarDate>,
}

/// A checked purchase ready to be recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPurchase {
    pub feed_type: String,
    pub purchase_weight: f64,
    pub price_per_unit: f64,
    pub purchase_date: CalendarDate,
}

impl AddPurchase {
    /// All four fields are required. A purchase must add a positive weight.
    pub fn validate(self) -> LedgerResult<NewPurchase> {
        let (Some(feed_type), Some(weight), Some(price), Some(date)) = (
            required_text(self.feed_type),
            self.purchase_weight,
            self.purchase_price,
            self.purchase_date,
        ) else {
            return Err(LedgerError::validation(ALL_FIELDS_REQUIRED));
        };
        if weight <= 0.0 {
            return Err(LedgerError::validation(
                "Purchase weight must be greater than zero.",
            ));
        }
        Ok(NewPurchase {
            feed_type,
            purchase_weight: weight,
            price_per_unit: non_negative(price, "Purchase price")?,
            purchase_date: date,
        })
    }
}

/// Body of `PUT /feedStock/:feedStockId/history/:historyId`.
///
/// Only the supplied fields are applied. A weight of `0` is a supplied value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchase {
    #[serde(default)]
    pub purchase_date: Option<CalendarDate>,
    #[serde(default, deserialize_with = "amount::deserialize_opt")]
    pub purchase_weight: Option<f64>,
    #[serde(default, deserialize_with = "amount::deserialize_opt")]
    pub price_per_unit: Option<f64>,
}

impl UpdatePurchase {
    pub fn validate(self) -> LedgerResult<Self> {
        if let Some(weight) = self.purchase_weight {
            non_negative(weight, "Purchase weight")?;
        }
        if let Some(price) = self.price_per_unit {
            non_negative(price, "Price per unit")?;
        }
        Ok(self)
    }
}

/// Body of `POST /medicine/addMedicineToFlock/:flockId`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVaccination {
    #[serde(default)]
    pub vaccine_name: Option<String>,
    #[serde(default)]
    pub vaccination_date: Option<CalendarDate>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "amount::deserialize_opt")]
    pub cost: Option<f64>,
}

/// A checked vaccination ready to be recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct NewVaccination {
    pub vaccine_name: String,
    pub vaccination_date: CalendarDate,
    pub dosage: String,
    pub cost: f64,
}

impl AddVaccination {
    /// All four fields are required; a cost of `0` counts as provided.
    pub fn validate(self) -> LedgerResult<NewVaccination> {
        let (Some(vaccine_name), Some(vaccination_date), Some(dosage), Some(cost)) = (
            required_text(self.vaccine_name),
            self.vaccination_date,
            required_text(self.dosage),
            self.cost,
        ) else {
            return Err(LedgerError::validation("All fields are required"));
        };
        Ok(NewVaccination {
            vaccine_name,
            vaccination_date,
            dosage,
            cost: non_negative(cost, "Cost")?,
        })
    }
}

/// Body of `PUT /medicine/updateVaccinationById/:flockId`.
///
/// Carries the id of the entry being replaced next to its new fields.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVaccination {
    #[serde(rename = "_id", default)]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub fields: AddVaccination,
}

impl UpdateVaccination {
    pub fn validate(self) -> LedgerResult<(RecordId, NewVaccination)> {
        let fields = self.fields.validate()?;
        let id = self
            .id
            .ok_or_else(|| LedgerError::validation("Vaccination id is required"))?;
        Ok((id, fields))
    }
}

/// Body of `POST /flock/addFlock`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFlock {
    #[serde(default)]
    pub flock_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<CalendarDate>,
}

/// A checked flock registration.
#[derive(Clone, Debug, PartialEq)]
pub struct NewFlock {
    pub flock_name: String,
    pub start_date: CalendarDate,
}

impl RegisterFlock {
    pub fn validate(self) -> LedgerResult<NewFlock> {
        match (required_text(self.flock_name), self.start_date) {
            (Some(flock_name), Some(start_date)) => Ok(NewFlock {
                flock_name,
                start_date,
            }),
            _ => Err(LedgerError::validation(ALL_FIELDS_REQUIRED)),
        }
    }
}
