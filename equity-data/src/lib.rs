//! CSV loaders for grants and tax bracket schedules.

mod bracket_loader;
mod grant_loader;

pub use bracket_loader::{TaxBracketLoader, TaxBracketLoaderError, TaxBracketRecord};
pub use grant_loader::{GrantLoadError, GrantLoader, LoadMode};
