use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub confirmed: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberCount {
    pub total: i64,
    pub confirmed: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub email: String,
}
