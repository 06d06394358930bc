pub mod dto;
pub mod error;
pub mod service;

pub use dto::{Benefit, BenefitFilters, Benefits, Consumer, ConsumerList, CustomerPage};
pub use error::CustomerServiceError;
pub use service::{
    extract_benefits, extract_consumers, filter_consumers, CustomerListState, CustomerService,
    CustomerServiceApi,
};
