use chrono::NaiveDate;
use database_layer::impl_entity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Billing currency; `exchange_rate` is relative to the default currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Currency {
    pub id: Uuid,
    pub code: String, // ISO 4217
    pub name: String,
    pub symbol: String,
    pub exchange_rate: Decimal,
    pub is_default: bool,
}

impl_entity!(Currency, table = "currencies", fields = [
    id: Uuid,
    code: Text [searchable],
    name: Text [searchable],
    symbol: Text,
    exchange_rate: Decimal,
    is_default: Bool,
]);

/// Billable product or service line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub currency_id: Uuid,
    pub is_active: bool,
}

impl_entity!(Product, table = "products", fields = [
    id: Uuid,
    code: Text [searchable],
    name: Text [searchable],
    description: Text [searchable],
    unit_price: Decimal,
    currency_id: Uuid,
    is_active: Bool,
]);

/// Patient invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub patient_id: Uuid,
    pub visit_id: Option<Uuid>,
    pub currency_id: Uuid,
    pub total_amount: Decimal,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub status: String,
}

impl_entity!(Invoice, table = "invoices", fields = [
    id: Uuid,
    invoice_number: Text [searchable],
    patient_id: Uuid,
    visit_id: Uuid,
    currency_id: Uuid,
    total_amount: Decimal,
    issued_on: Date,
    due_on: Date,
    status: Text [searchable],
]);
