use std::fmt;
use std::path::PathBuf;

use crate::types::DeployableUnitName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSpec {
    pub path: Option<PathBuf>,
    pub name: String,
}

impl ContractSpec {
    pub fn path_name(path: PathBuf, name: impl ToString) -> Self {
        Self {
            path: Some(path),
            name: name.to_string(),
        }
    }

    pub fn name(name: impl ToString) -> Self {
        Self {
            path: None,
            name: name.to_string(),
        }
    }

    /// Units are either a bare contract name or `<path>:<name>`
    pub fn from_unit(unit: &DeployableUnitName) -> Self {
        match unit.as_str().rsplit_once(':') {
            Some((path, name)) if !path.is_empty() && !name.is_empty() => {
                Self::path_name(PathBuf::from(path), name)
            }
            _ => Self::name(unit.as_str()),
        }
    }
}

impl fmt::Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = self.path.as_deref() {
            write!(f, "{}:{}", path.display(), self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_unit() -> eyre::Result<()> {
        let spec = ContractSpec::from_unit(&"AptosExchange".parse()?);

        assert_eq!(spec, ContractSpec::name("AptosExchange"));
        assert_eq!(spec.to_string(), "AptosExchange");

        Ok(())
    }

    #[test]
    fn unit_with_path() -> eyre::Result<()> {
        let spec = ContractSpec::from_unit(
            &"src/AptosExchange.sol:AptosExchange".parse()?,
        );

        assert_eq!(spec.path, Some(PathBuf::from("src/AptosExchange.sol")));
        assert_eq!(spec.name, "AptosExchange");
        assert_eq!(spec.to_string(), "src/AptosExchange.sol:AptosExchange");

        Ok(())
    }
}
