use serde::Serialize;
use sqlx::FromRow;

/// A parking slot. Slot numbers are unique and start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Slot {
    pub id: i64,
    pub slot_number: i64,
    pub is_active: bool,
}

impl Slot {
    pub fn status_label(&self) -> &'static str {
        if self.is_active { "Active" } else { "Inactive" }
    }
}
