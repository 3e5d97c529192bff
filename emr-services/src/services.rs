// Per-entity service aliases and the entity registry
use clap::ValueEnum;
use database_layer::PgRepository;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::*;
use crate::service::EntityService;

pub type PatientService<R = PgRepository<Patient>> = EntityService<Patient, R>;
pub type DoctorService<R = PgRepository<Doctor>> = EntityService<Doctor, R>;
pub type ComorbidityService<R = PgRepository<Comorbidity>> = EntityService<Comorbidity, R>;
pub type VisitService<R = PgRepository<Visit>> = EntityService<Visit, R>;
pub type DayVisitService<R = PgRepository<DayVisit>> = EntityService<DayVisit, R>;
pub type CurrencyService<R = PgRepository<Currency>> = EntityService<Currency, R>;
pub type ProductService<R = PgRepository<Product>> = EntityService<Product, R>;
pub type InvoiceService<R = PgRepository<Invoice>> = EntityService<Invoice, R>;

/// Every registered entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Patient,
    Doctor,
    Comorbidity,
    Visit,
    DayVisit,
    Currency,
    Product,
    Invoice,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Patient,
        EntityKind::Doctor,
        EntityKind::Comorbidity,
        EntityKind::Visit,
        EntityKind::DayVisit,
        EntityKind::Currency,
        EntityKind::Product,
        EntityKind::Invoice,
    ];

    /// Backing table of the entity
    pub fn table(self) -> &'static str {
        use database_layer::Entity;
        match self {
            EntityKind::Patient => Patient::TABLE,
            EntityKind::Doctor => Doctor::TABLE,
            EntityKind::Comorbidity => Comorbidity::TABLE,
            EntityKind::Visit => Visit::TABLE,
            EntityKind::DayVisit => DayVisit::TABLE,
            EntityKind::Currency => Currency::TABLE,
            EntityKind::Product => Product::TABLE,
            EntityKind::Invoice => Invoice::TABLE,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Patient => "patient",
            EntityKind::Doctor => "doctor",
            EntityKind::Comorbidity => "comorbidity",
            EntityKind::Visit => "visit",
            EntityKind::DayVisit => "day-visit",
            EntityKind::Currency => "currency",
            EntityKind::Product => "product",
            EntityKind::Invoice => "invoice",
        };
        f.write_str(name)
    }
}
