pub mod candidates;
pub mod density;

pub use candidates::{tactical_candidates, Candidate};
pub use density::{density_for_side, DensityClassifier, DensityReport, SideDensity};
