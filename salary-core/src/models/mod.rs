mod conversion;
mod insurance;
mod relief;
mod tax_bracket;
mod tax_policy;

pub use conversion::{ConversionRequest, Direction, EmployeeContributions, SalaryBreakdown};
pub use insurance::InsuranceRates;
pub use relief::{ReliefFormula, TaperSegment};
pub use tax_bracket::TaxBracket;
pub use tax_policy::{PolicyError, TaxPolicy, TaxPolicyConfig};
