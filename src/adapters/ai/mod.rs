//! Oracle adapters - Gemini client and the test mock.

mod gemini_oracle;
mod mock_oracle;

pub use gemini_oracle::{GeminiConfig, GeminiOracle};
pub use mock_oracle::MockOracle;
