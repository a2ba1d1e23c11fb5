pub mod dcf;
pub mod request;
pub mod resolve;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use dcf::{
    build_valuation, calculate_dcf, calculate_dcf_with_defaults, value_company, DcfCalcOptions,
    DcfInputs, DcfResults, DcfValuation,
};
pub use request::ValuationRequest;
pub use resolve::{ProjectionPath, ResolvedAssumptions, ValueSource};

#[cfg(feature = "sensitivity")]
pub use sensitivity::{
    generate_sensitivity_data, generate_sensitivity_data_with_defaults, run_sensitivity,
    SensitivityData,
};
