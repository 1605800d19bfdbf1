use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Digits-only phone number when one is present, `student-{index}`
    /// otherwise. Rows sharing a phone number share an id, so any id-keyed
    /// view of the roster is last-writer-wins in row order.
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    pub image_url: String,
    pub class: String,
    pub notes: String,
}
