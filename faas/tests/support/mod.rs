pub mod faas;
pub mod http;
