//! Remediation cost functions.
//!
//! A remediation function estimates the effort to fix one violation of a
//! rule. The shape of the function decides which parameters are legal:
//! - `Linear`: coefficient only (cost grows with the issue size)
//! - `LinearOffset`: coefficient and offset
//! - `ConstantIssue`: offset only (flat cost per issue)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DebtModelError;

/// Shape of a remediation cost function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionKind {
    Linear,
    LinearOffset,
    ConstantIssue,
}

impl FunctionKind {
    /// Stable wire name, used in XML documents and rule storage
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Linear => "LINEAR",
            FunctionKind::LinearOffset => "LINEAR_OFFSET",
            FunctionKind::ConstantIssue => "CONSTANT_ISSUE",
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FunctionKind {
    type Err = DebtModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LINEAR" => Ok(FunctionKind::Linear),
            "LINEAR_OFFSET" => Ok(FunctionKind::LinearOffset),
            "CONSTANT_ISSUE" => Ok(FunctionKind::ConstantIssue),
            other => Err(DebtModelError::invalid(format!(
                "unknown remediation function '{other}'"
            ))),
        }
    }
}

/// A remediation function with its duration parameters.
///
/// Coefficient and offset are duration texts ("30min", "1d") interpreted by
/// the issue computation downstream; this crate only enforces which of them
/// must be present for a given kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationFunction {
    pub kind: FunctionKind,
    pub coefficient: Option<String>,
    pub offset: Option<String>,
}

impl RemediationFunction {
    /// Builds a function, validating the parameter shape for `kind`
    pub fn new(
        kind: FunctionKind,
        coefficient: Option<String>,
        offset: Option<String>,
    ) -> Result<Self, DebtModelError> {
        match kind {
            FunctionKind::Linear => {
                if coefficient.is_none() {
                    return Err(DebtModelError::invalid(
                        "LINEAR function requires a coefficient",
                    ));
                }
                if offset.is_some() {
                    return Err(DebtModelError::invalid(
                        "LINEAR function does not accept an offset",
                    ));
                }
            }
            FunctionKind::LinearOffset => {
                if coefficient.is_none() || offset.is_none() {
                    return Err(DebtModelError::invalid(
                        "LINEAR_OFFSET function requires a coefficient and an offset",
                    ));
                }
            }
            FunctionKind::ConstantIssue => {
                if offset.is_none() {
                    return Err(DebtModelError::invalid(
                        "CONSTANT_ISSUE function requires an offset",
                    ));
                }
                if coefficient.is_some() {
                    return Err(DebtModelError::invalid(
                        "CONSTANT_ISSUE function does not accept a coefficient",
                    ));
                }
            }
        }
        Ok(Self {
            kind,
            coefficient,
            offset,
        })
    }

    pub fn linear(coefficient: impl Into<String>) -> Self {
        Self {
            kind: FunctionKind::Linear,
            coefficient: Some(coefficient.into()),
            offset: None,
        }
    }

    pub fn linear_with_offset(coefficient: impl Into<String>, offset: impl Into<String>) -> Self {
        Self {
            kind: FunctionKind::LinearOffset,
            coefficient: Some(coefficient.into()),
            offset: Some(offset.into()),
        }
    }

    pub fn constant_per_issue(offset: impl Into<String>) -> Self {
        Self {
            kind: FunctionKind::ConstantIssue,
            coefficient: None,
            offset: Some(offset.into()),
        }
    }
}

impl fmt::Display for RemediationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(coefficient) = &self.coefficient {
            write!(f, " coefficient={coefficient}")?;
        }
        if let Some(offset) = &self.offset {
            write!(f, " offset={offset}")?;
        }
        Ok(())
    }
}
