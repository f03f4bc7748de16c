pub mod amount;
pub mod batch;
pub mod loader;
pub mod logging;
pub mod report;

pub use amount::{ParseAmountError, parse_amount};
pub use batch::BatchLoadError;
pub use loader::{PolicyFile, PolicyFileError, PolicyLoader};
pub use report::{BatchOutcome, ConversionReport, OutputFormat};
