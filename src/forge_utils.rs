pub mod common;
pub mod create;
pub mod inspect_abi;

pub use self::common::ContractSpec;
pub use self::create::{ForgeCreate, ForgeOutput};
pub use self::inspect_abi::ForgeInspectAbi;

/// Forge may print warnings after the JSON payload
pub(crate) fn strip_non_json(s: &str) -> &str {
    if let Some(last_closing_brace) = s.rfind(|c: char| c == '}' || c == ']') {
        &s[..=last_closing_brace]
    } else {
        s
    }
}
