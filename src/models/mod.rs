pub mod enums;
pub mod appointment;
pub mod examination;
pub mod soap_note;
pub mod validation;

pub use enums::*;
pub use appointment::*;
pub use examination::*;
pub use soap_note::*;
pub use validation::*;
