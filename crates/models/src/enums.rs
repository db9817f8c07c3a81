//! String-backed status enums. Rows keep the text form; these give it a type.

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ModelError::Validation(format!(
                        concat!("unknown ", stringify!($name), ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum!(PlanStatus {
    Active => "Active",
    Inactive => "Inactive",
});

string_enum!(
    /// How a plan decides an asset is due.
    FrequencyType {
        Hours => "hours",
        Days => "days",
        Meter1 => "meter1",
        Meter2 => "meter2",
        Meter3 => "meter3",
        Meter4 => "meter4",
    }
);

string_enum!(EventStatus {
    Planned => "Planned",
    InProgress => "In Progress",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

string_enum!(ActionStatus {
    NotStarted => "Not Started",
    InProgress => "In Progress",
    Complete => "Complete",
    Skipped => "Skipped",
});

string_enum!(Priority {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

string_enum!(BuildStatus {
    Initialized => "Initialized",
    InProgress => "In Progress",
    ReadyForReview => "Ready for Review",
    Submitted => "Submitted",
    Abandoned => "Abandoned",
});

string_enum!(AttachmentLevel {
    ActionSet => "action_set",
    Action => "action",
});

/// Status for part demands and tool lines on a maintenance event.
pub const LINE_STATUS_PLANNED: &str = "Planned";

/// Default `attachment_type` when none is given.
pub const DEFAULT_ATTACHMENT_TYPE: &str = "Document";

impl FrequencyType {
    /// 1-based meter slot for meter frequencies.
    pub fn meter_index(&self) -> Option<usize> {
        match self {
            FrequencyType::Meter1 => Some(1),
            FrequencyType::Meter2 => Some(2),
            FrequencyType::Meter3 => Some(3),
            FrequencyType::Meter4 => Some(4),
            FrequencyType::Hours | FrequencyType::Days => None,
        }
    }

    pub fn is_time_based(&self) -> bool {
        matches!(self, FrequencyType::Hours | FrequencyType::Days)
    }
}

impl BuildStatus {
    /// Submitted and abandoned builds no longer accept edits or submission.
    pub fn is_closed(&self) -> bool {
        matches!(self, BuildStatus::Submitted | BuildStatus::Abandoned)
    }
}

impl EventStatus {
    /// Statuses that block creation of another event for the same asset and plan.
    pub const OPEN: [EventStatus; 2] = [EventStatus::Planned, EventStatus::InProgress];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_forms() {
        assert_eq!("In Progress".parse::<EventStatus>().unwrap(), EventStatus::InProgress);
        assert_eq!("meter3".parse::<FrequencyType>().unwrap(), FrequencyType::Meter3);
        assert_eq!(BuildStatus::ReadyForReview.as_str(), "Ready for Review");
        assert_eq!(ActionStatus::NotStarted.to_string(), "Not Started");
    }

    #[test]
    fn rejects_unknown_values() {
        let err = "weekly".parse::<FrequencyType>().unwrap_err();
        assert!(err.to_string().contains("FrequencyType"));
        assert!("planned".parse::<EventStatus>().is_err());
    }

    #[test]
    fn serde_uses_stored_text() {
        let s = serde_json::to_string(&EventStatus::InProgress).unwrap();
        assert_eq!(s, "\"In Progress\"");
        let l: AttachmentLevel = serde_json::from_str("\"action_set\"").unwrap();
        assert_eq!(l, AttachmentLevel::ActionSet);
    }

    #[test]
    fn meter_slots() {
        assert_eq!(FrequencyType::Meter4.meter_index(), Some(4));
        assert_eq!(FrequencyType::Days.meter_index(), None);
        assert!(FrequencyType::Hours.is_time_based());
        assert!(BuildStatus::Abandoned.is_closed());
        assert!(!BuildStatus::InProgress.is_closed());
    }
}
