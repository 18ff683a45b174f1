#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectErrorKind {
    #[error("Property {member} is readonly")]
    ReadOnly { member: &'static str },
}
