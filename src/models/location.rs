use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a `city, state` argument is rejected before a scan starts
#[derive(Debug, Error, PartialEq)]
pub enum LocationError {
    #[error("Location string should be provided as city, state (got '{0}').")]
    Malformed(String),
    #[error("{0} is not a valid state.")]
    UnknownState(String),
}

/// City plus two-letter state code, matched against listing page titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLocation {
    pub city: String,
    pub state_abbrev: String,
}

impl fmt::Display for TargetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.state_abbrev)
    }
}

impl FromStr for TargetLocation {
    type Err = LocationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let [city, state] = parts.as_slice() else {
            return Err(LocationError::Malformed(value.to_string()));
        };
        if city.is_empty() || state.is_empty() {
            return Err(LocationError::Malformed(value.to_string()));
        }

        let state_abbrev = if state.len() == 2 {
            state.to_ascii_uppercase()
        } else {
            state_abbreviation(state)
                .ok_or_else(|| LocationError::UnknownState(state.to_string()))?
                .to_string()
        };

        Ok(Self {
            city: city.to_string(),
            state_abbrev,
        })
    }
}

/// Resolve a full state or territory name to its postal code, ignoring case
pub fn state_abbreviation(name: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(full, _)| full.eq_ignore_ascii_case(name.trim()))
        .map(|(_, abbrev)| *abbrev)
}

const US_STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
    ("District of Columbia", "DC"),
    ("American Samoa", "AS"),
    ("Guam", "GU"),
    ("Northern Mariana Islands", "MP"),
    ("Puerto Rico", "PR"),
    ("United States Minor Outlying Islands", "UM"),
    ("U.S. Virgin Islands", "VI"),
];
