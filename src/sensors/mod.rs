pub mod shtc3;

pub use shtc3::Shtc3;
