use crate::core::FieldId;

/// The three values the registration form collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::Name => &self.name,
            FieldId::Email => &self.email,
            FieldId::Phone => &self.phone,
        }
    }

    /// Overwrites the field as-is; nothing is checked at input time.
    pub fn set_field(&mut self, field: FieldId, value: impl Into<String>) {
        let slot = match field {
            FieldId::Name => &mut self.name,
            FieldId::Email => &mut self.email,
            FieldId::Phone => &mut self.phone,
        };
        *slot = value.into();
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.email.clear();
        self.phone.clear();
    }

    /// Presence check only. No format validation is applied to email or phone.
    pub fn is_valid(&self) -> bool {
        FieldId::ALL
            .iter()
            .all(|field| !self.get(*field).is_empty())
    }

    pub fn missing(&self) -> Vec<FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }
}
