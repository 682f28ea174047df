use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod event;
pub mod organization;
pub mod volunteer;

pub use event::{Event, NewEvent};
pub use organization::{NewOrganization, Organization};
pub use volunteer::{NewVolunteer, Volunteer};

/// Column widths from the schema, counted in characters.
pub const MAX_USERNAME_LEN: usize = 120;
pub const MAX_DISPLAY_NAME_LEN: usize = 255;
pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_DESCRIPTION_LEN: usize = 255;

pub fn exceeds(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Volunteer,
    Organization,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Volunteer => "volunteer",
            Role::Organization => "organization",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volunteer" => Ok(Role::Volunteer),
            "organization" => Ok(Role::Organization),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A logged-in account of either role.
#[derive(Debug, Clone)]
pub enum Account {
    Volunteer(Volunteer),
    Organization(Organization),
}

impl Account {
    pub fn id(&self) -> Uuid {
        match self {
            Account::Volunteer(v) => v.id,
            Account::Organization(o) => o.id,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Account::Volunteer(v) => &v.username,
            Account::Organization(o) => &o.username,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Account::Volunteer(v) => &v.password_hash,
            Account::Organization(o) => &o.password_hash,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Account::Volunteer(_) => Role::Volunteer,
            Account::Organization(_) => Role::Organization,
        }
    }
}
