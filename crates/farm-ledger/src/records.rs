use chrono::{DateTime, Utc};
use farm_store::Document;
use farm_types::{CalendarDate, RecordId};
use serde::{Deserialize, Serialize};

use crate::aggregate::Ledger;
use crate::requests::{NewPurchase, NewVaccination};

/// One purchase of a feed type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEntry {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub purchase_weight: f64,
    pub price_per_unit: f64,
    pub purchase_date: CalendarDate,
}

impl PurchaseEntry {
    pub fn new(purchase: &NewPurchase) -> Self {
        Self {
            id: RecordId::new(),
            purchase_weight: purchase.purchase_weight,
            price_per_unit: purchase.price_per_unit,
            purchase_date: purchase.purchase_date,
        }
    }
}

/// Stock ledger for a single feed type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStock {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub feed_type: String,
    pub current_stock: f64,
    pub purchase_history: Vec<PurchaseEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedStock {
    /// A fresh record holding one purchase.
    pub fn new(purchase: &NewPurchase, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            feed_type: purchase.feed_type.clone(),
            current_stock: purchase.purchase_weight,
            purchase_history: vec![PurchaseEntry::new(purchase)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn entry_mut(&mut self, id: &RecordId) -> Option<&mut PurchaseEntry> {
        self.purchase_history.iter_mut().find(|e| &e.id == id)
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove_entry(&mut self, id: &RecordId) -> Option<PurchaseEntry> {
        let index = self.purchase_history.iter().position(|e| &e.id == id)?;
        Some(self.purchase_history.remove(index))
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Ledger for FeedStock {
    type Entry = PurchaseEntry;

    fn entries(&self) -> &[PurchaseEntry] {
        &self.purchase_history
    }

    fn amount(entry: &PurchaseEntry) -> f64 {
        entry.purchase_weight
    }

    fn aggregate(&self) -> f64 {
        self.current_stock
    }

    fn set_aggregate(&mut self, value: f64) {
        self.current_stock = value;
    }
}

impl Document for FeedStock {
    const COLLECTION: &'static str = "feedstocks";

    fn id(&self) -> RecordId {
        self.id
    }
}

/// One vaccination given to a flock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccination {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub vaccine_name: String,
    pub vaccination_date: CalendarDate,
    pub dosage: String,
    pub cost: f64,
}

impl Vaccination {
    pub fn new(input: &NewVaccination) -> Self {
        Self::with_id(RecordId::new(), input)
    }

    /// Build an entry that keeps an existing id.
    fn with_id(id: RecordId, input: &NewVaccination) -> Self {
        Self {
            id,
            vaccine_name: input.vaccine_name.clone(),
            vaccination_date: input.vaccination_date,
            dosage: input.dosage.clone(),
            cost: input.cost,
        }
    }
}

/// Vaccination cost ledger for a single flock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub flock_id: RecordId,
    pub total_cost: f64,
    pub vaccination: Vec<Vaccination>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    pub fn new(flock_id: RecordId, first: &NewVaccination, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            flock_id,
            total_cost: first.cost,
            vaccination: vec![Vaccination::new(first)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn remove_entry(&mut self, id: &RecordId) -> Option<Vaccination> {
        let index = self.vaccination.iter().position(|v| &v.id == id)?;
        Some(self.vaccination.remove(index))
    }

    /// Replace the fields of an entry in place. Returns `false` if no entry has the id.
    pub fn replace_entry(&mut self, id: &RecordId, input: &NewVaccination) -> bool {
        match self.vaccination.iter_mut().find(|v| &v.id == id) {
            Some(slot) => {
                *slot = Vaccination::with_id(*id, input);
                true
            }
            None => false,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Ledger for Medicine {
    type Entry = Vaccination;

    const FLOOR: Option<f64> = Some(0.0);

    fn entries(&self) -> &[Vaccination] {
        &self.vaccination
    }

    fn amount(entry: &Vaccination) -> f64 {
        entry.cost
    }

    fn aggregate(&self) -> f64 {
        self.total_cost
    }

    fn set_aggregate(&mut self, value: f64) {
        self.total_cost = value;
    }
}

impl Document for Medicine {
    const COLLECTION: &'static str = "medicines";

    fn id(&self) -> RecordId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(weight: f64) -> NewPurchase {
        NewPurchase {
            feed_type: "Silage".into(),
            purchase_weight: weight,
            price_per_unit: 10.0,
            purchase_date: CalendarDate::from_ymd(2024, 1, 1).unwrap(),
        }
    }

    fn shot(cost: f64) -> NewVaccination {
        NewVaccination {
            vaccine_name: "Newcastle".into(),
            vaccination_date: CalendarDate::from_ymd(2024, 1, 1).unwrap(),
            dosage: "1ml".into(),
            cost,
        }
    }

    #[test]
    fn new_feed_stock_starts_with_entry_weight() {
        let stock = FeedStock::new(&purchase(100.0), Utc::now());
        assert_eq!(stock.current_stock, 100.0);
        assert_eq!(stock.purchase_history.len(), 1);
        assert_eq!(stock.created_at, stock.updated_at);
    }

    #[test]
    fn remove_entry_keeps_order() {
        let mut stock = FeedStock::new(&purchase(1.0), Utc::now());
        stock.purchase_history.push(PurchaseEntry::new(&purchase(2.0)));
        stock.purchase_history.push(PurchaseEntry::new(&purchase(3.0)));
        let middle = stock.purchase_history[1].id;
        let removed = stock.remove_entry(&middle).unwrap();
        assert_eq!(removed.purchase_weight, 2.0);
        let weights: Vec<f64> = stock.purchase_history.iter().map(|e| e.purchase_weight).collect();
        assert_eq!(weights, vec![1.0, 3.0]);
        assert!(stock.remove_entry(&middle).is_none());
    }

    #[test]
    fn feed_stock_wire_names() {
        let stock = FeedStock::new(&purchase(100.0), Utc::now());
        let json = serde_json::to_value(&stock).unwrap();
        assert!(json.get("_id").is_some());
        assert_eq!(json["feedType"], "Silage");
        assert_eq!(json["currentStock"], 100.0);
        let entry = &json["purchaseHistory"][0];
        assert_eq!(entry["purchaseWeight"], 100.0);
        assert_eq!(entry["pricePerUnit"], 10.0);
        assert_eq!(entry["purchaseDate"], "2024-01-01");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn replace_entry_preserves_id() {
        let flock = RecordId::new();
        let mut medicine = Medicine::new(flock, &shot(500.0), Utc::now());
        let id = medicine.vaccination[0].id;
        assert!(medicine.replace_entry(&id, &shot(250.0)));
        assert_eq!(medicine.vaccination[0].id, id);
        assert_eq!(medicine.vaccination[0].cost, 250.0);
        assert!(!medicine.replace_entry(&RecordId::new(), &shot(1.0)));
    }

    #[test]
    fn medicine_wire_names() {
        let medicine = Medicine::new(RecordId::new(), &shot(500.0), Utc::now());
        let json = serde_json::to_value(&medicine).unwrap();
        assert_eq!(json["totalCost"], 500.0);
        assert_eq!(json["flockId"], medicine.flock_id.to_string());
        let v = &json["vaccination"][0];
        assert_eq!(v["vaccineName"], "Newcastle");
        assert_eq!(v["vaccinationDate"], "2024-01-01");
        assert_eq!(v["dosage"], "1ml");
        assert_eq!(v["cost"], 500.0);
    }

    #[test]
    fn records_deserialize_from_stored_form() {
        let stock = FeedStock::new(&purchase(42.0), Utc::now());
        let json = serde_json::to_string(&stock).unwrap();
        let back: FeedStock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stock);
    }
}
