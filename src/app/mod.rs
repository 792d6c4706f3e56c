pub mod build_use_case;
pub mod inspect_use_case;
pub mod ports;
