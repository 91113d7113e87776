//! Built-in validators for common validation scenarios

pub mod confirmed;
pub mod custom;
pub mod email;
pub mod length;
pub mod membership;
pub mod numeric;
pub mod pattern;
pub mod required;
pub mod unique;

pub use confirmed::ConfirmedValidator;
pub use custom::CustomValidator;
pub use email::EmailValidator;
pub use length::LengthValidator;
pub use membership::InValidator;
pub use numeric::NumericValidator;
pub use pattern::PatternValidator;
pub use required::RequiredValidator;
pub use unique::UniqueValidator;
