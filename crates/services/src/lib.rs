mod price_oracle;
mod price_quoter;

pub use price_oracle::*;
pub use price_quoter::*;
