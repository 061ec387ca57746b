use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Program delivery type, used purely as a grouping/filter dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    Online,
    Onsite,
    Service,
}

impl std::fmt::Display for ProgramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramType::Online => write!(f, "online"),
            ProgramType::Onsite => write!(f, "onsite"),
            ProgramType::Service => write!(f, "service"),
        }
    }
}

impl std::str::FromStr for ProgramType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "online" => Ok(ProgramType::Online),
            "onsite" => Ok(ProgramType::Onsite),
            "service" => Ok(ProgramType::Service),
            _ => Err(format!("Invalid program type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Program {
    pub program_code: String,
    pub name: String,
    pub program_type: ProgramType,
}
