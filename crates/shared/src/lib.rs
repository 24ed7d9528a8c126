pub mod criteria;
pub mod domain;
pub mod error;
pub mod validation;
