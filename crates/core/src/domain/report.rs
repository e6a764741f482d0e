//! Row types for the analyst-report schema.
//!
//! The schema is populated by a separate ingestion path; the server only
//! creates the tables and seeds the rating codes. `Report` references the
//! four dimension tables by id (`rating_code` by its canonical code).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Stock {
    pub id: i64,
    pub stock_code: String,
    pub stock_name: String,
    pub company_info_url: Option<String>,
    pub current_price: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Broker {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Report {
    pub id: i64,
    pub written_date: NaiveDate,
    pub title: String,
    pub fair_price: Option<i64>,
    pub current_price: Option<i64>,
    pub expected_return: Option<f64>,
    pub attachment_url: Option<String>,

    pub summary: Option<String>,
    pub novice_content: Option<String>,
    pub expert_content: Option<String>,

    pub stock_id: i64,
    pub broker_id: Option<i64>,
    pub author_id: Option<i64>,
    pub rating_code: String,
}
