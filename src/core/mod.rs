pub mod form;
pub mod registration;
pub mod scheduler;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    Name,
    Email,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Tel,
}

impl FieldId {
    pub const ALL: [FieldId; 3] = [FieldId::Name, FieldId::Email, FieldId::Phone];

    /// Name used in analytics payloads and in the `name` attribute of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Full Name",
            Self::Email => "Email Address",
            Self::Phone => "Phone Number",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "John Doe",
            Self::Email => "john@example.com",
            Self::Phone => "+1 (555) 123-4567",
        }
    }

    pub fn kind(self) -> InputKind {
        match self {
            Self::Name => InputKind::Text,
            Self::Email => InputKind::Email,
            Self::Phone => InputKind::Tel,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Email => 1,
            Self::Phone => 2,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything on the form that can hold keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Field(FieldId),
    Submit,
}

impl FocusTarget {
    pub const ORDER: [FocusTarget; 4] = [
        FocusTarget::Field(FieldId::Name),
        FocusTarget::Field(FieldId::Email),
        FocusTarget::Field(FieldId::Phone),
        FocusTarget::Submit,
    ];

    pub fn position(self) -> usize {
        match self {
            Self::Field(field) => field.index(),
            Self::Submit => Self::ORDER.len() - 1,
        }
    }

    /// Cycles through `ORDER`, wrapping at both ends.
    pub fn step(self, direction: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let next = ((self.position() as isize + direction).rem_euclid(len)) as usize;
        Self::ORDER[next]
    }
}
