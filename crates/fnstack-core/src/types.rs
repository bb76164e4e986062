// Typed Lambda and CloudFormation enums
//
// Each enum renders to the exact string CloudFormation expects and parses
// the same string back (plus a few aliases) for config and env overrides.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruction set architecture of a function or layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Architecture {
    #[default]
    #[serde(rename = "arm64")]
    Arm64,
    #[serde(rename = "x86_64")]
    X86_64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Arm64 => "arm64",
            Architecture::X86_64 => "x86_64",
        }
    }

    /// Rust target triple used when building a binary for this architecture
    pub fn rust_target(&self) -> &'static str {
        match self {
            Architecture::Arm64 => "aarch64-unknown-linux-gnu",
            Architecture::X86_64 => "x86_64-unknown-linux-gnu",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            "x86_64" | "amd64" => Ok(Architecture::X86_64),
            _ => Err(CoreError::UnknownVariant {
                kind: "architecture",
                value: s.to_string(),
            }),
        }
    }
}

/// Lambda runtime identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Runtime {
    #[serde(rename = "nodejs16.x")]
    Nodejs16x,
    #[serde(rename = "nodejs18.x")]
    Nodejs18x,
    #[serde(rename = "nodejs20.x")]
    Nodejs20x,
    #[serde(rename = "provided.al2")]
    ProvidedAl2,
    #[default]
    #[serde(rename = "provided.al2023")]
    ProvidedAl2023,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Nodejs16x => "nodejs16.x",
            Runtime::Nodejs18x => "nodejs18.x",
            Runtime::Nodejs20x => "nodejs20.x",
            Runtime::ProvidedAl2 => "provided.al2",
            Runtime::ProvidedAl2023 => "provided.al2023",
        }
    }

    /// OS-only runtimes run a `bootstrap` executable instead of a script
    pub fn is_custom(&self) -> bool {
        matches!(self, Runtime::ProvidedAl2 | Runtime::ProvidedAl2023)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runtime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nodejs16.x" => Ok(Runtime::Nodejs16x),
            "nodejs18.x" => Ok(Runtime::Nodejs18x),
            "nodejs20.x" => Ok(Runtime::Nodejs20x),
            "provided.al2" => Ok(Runtime::ProvidedAl2),
            "provided.al2023" | "provided" => Ok(Runtime::ProvidedAl2023),
            _ => Err(CoreError::UnknownVariant {
                kind: "runtime",
                value: s.to_string(),
            }),
        }
    }
}

/// Active tracing mode requested for a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tracing {
    Active,
    PassThrough,
    Disabled,
}

impl FromStr for Tracing {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Tracing::Active),
            "pass_through" | "passthrough" => Ok(Tracing::PassThrough),
            "disabled" | "off" => Ok(Tracing::Disabled),
            _ => Err(CoreError::UnknownVariant {
                kind: "tracing mode",
                value: s.to_string(),
            }),
        }
    }
}

/// What happens to a resource's backing data when it leaves the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    #[default]
    Destroy,
    Retain,
    Snapshot,
}

impl RemovalPolicy {
    /// Value of the `DeletionPolicy` / `UpdateReplacePolicy` attributes
    pub fn as_cfn(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "Delete",
            RemovalPolicy::Retain => "Retain",
            RemovalPolicy::Snapshot => "Snapshot",
        }
    }
}

impl FromStr for RemovalPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "destroy" | "delete" => Ok(RemovalPolicy::Destroy),
            "retain" => Ok(RemovalPolicy::Retain),
            "snapshot" => Ok(RemovalPolicy::Snapshot),
            _ => Err(CoreError::UnknownVariant {
                kind: "removal policy",
                value: s.to_string(),
            }),
        }
    }
}
