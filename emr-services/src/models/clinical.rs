use chrono::{DateTime, NaiveDate, Utc};
use database_layer::impl_entity;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Registered patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub medical_record_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl_entity!(Patient, table = "patients", fields = [
    id: Uuid,
    medical_record_number: Text [searchable],
    first_name: Text [searchable],
    last_name: Text [searchable],
    date_of_birth: Date,
    gender: Text,
    phone: Text,
    email: Text,
    created_at: DateTime,
]);

/// Attending physician
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub license_number: String,
    pub is_active: bool,
}

impl_entity!(Doctor, table = "doctors", fields = [
    id: Uuid,
    first_name: Text [searchable],
    last_name: Text [searchable],
    specialty: Text [searchable],
    license_number: Text,
    is_active: Bool,
]);

/// Chronic condition recorded against a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comorbidity {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub icd10_code: String, // ICD-10-CM
    pub diagnosed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl_entity!(Comorbidity, table = "comorbidities", fields = [
    id: Uuid,
    patient_id: Uuid,
    name: Text [searchable],
    icd10_code: Text [searchable],
    diagnosed_on: Date,
    notes: Text [searchable],
]);

/// Outpatient or inpatient encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Visit {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub visit_date: DateTime<Utc>,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub status: String,
}

impl_entity!(Visit, table = "visits", fields = [
    id: Uuid,
    patient_id: Uuid,
    doctor_id: Uuid,
    visit_date: DateTime,
    reason: Text [searchable],
    diagnosis: Text [searchable],
    status: Text,
]);

/// Same-day admission attached to a visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DayVisit {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub ward: String,
    pub admitted_at: DateTime<Utc>,
    pub discharged_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl_entity!(DayVisit, table = "day_visits", fields = [
    id: Uuid,
    visit_id: Uuid,
    ward: Text [searchable],
    admitted_at: DateTime,
    discharged_at: DateTime,
    notes: Text [searchable],
]);
