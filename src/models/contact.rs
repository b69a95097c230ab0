//! Contact and congressional member records as read from the contacts store.

use serde::{Deserialize, Serialize};

/// Legislative chamber of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    /// Classify the chamber column. Only `house` (any letter case) is the
    /// House; every other value, including a missing one, is the Senate.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("house") => Self::House,
            _ => Self::Senate,
        }
    }
}

/// Member columns as they come back from the join, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMember {
    pub state: Option<String>,
    pub district: Option<String>,
    pub chamber: Option<String>,
}

/// Contact joined with its member, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContactMemberRow {
    pub zip_code: Option<String>,
    pub member: Option<RawMember>,
}

/// Validated contact-with-member row used for grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMemberRow {
    pub zip_code: String,
    pub state: String,
    /// Always present for house members; ignored for senators.
    pub district: Option<String>,
    pub chamber: Chamber,
}

/// Reason a joined row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("contact has no joined member")]
    MissingMember,
    #[error("member has no state")]
    MissingState,
    #[error("house member in {0} has no district")]
    MissingDistrict(String),
}

impl TryFrom<RawContactMemberRow> for ContactMemberRow {
    type Error = RowError;

    fn try_from(raw: RawContactMemberRow) -> Result<Self, Self::Error> {
        let member = raw.member.ok_or(RowError::MissingMember)?;
        let state = member
            .state
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(RowError::MissingState)?;
        let chamber = Chamber::parse(member.chamber.as_deref());
        let district = member
            .district
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        if chamber == Chamber::House && district.is_none() {
            return Err(RowError::MissingDistrict(state));
        }

        Ok(Self {
            zip_code: raw.zip_code.unwrap_or_default(),
            state,
            district,
            chamber,
        })
    }
}

impl ContactMemberRow {
    /// Grouping label: `"{state}-{district}"` for house, `"{state} (Senate)"` for senate.
    pub fn district_key(&self) -> String {
        match (self.chamber, self.district.as_deref()) {
            (Chamber::House, Some(district)) => format!("{}-{}", self.state, district),
            // Validation guarantees a district for house rows.
            (Chamber::House, None) | (Chamber::Senate, _) => format!("{} (Senate)", self.state),
        }
    }
}
