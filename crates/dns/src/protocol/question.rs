use super::record_type::RecordType;

/// `CLASS` value for the Internet, the only class we ever query.
pub const CLASS_IN: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub domain_name: String,
    pub r#type: RecordType,
    pub class: u16,
}

impl Question {
    pub fn new(domain_name: impl Into<String>, r#type: RecordType) -> Self {
        Self {
            domain_name: domain_name.into(),
            r#type,
            class: CLASS_IN,
        }
    }
}
