use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentType {
    NewPatient => "new-patient",
    FollowUp => "follow-up",
    Emergency => "emergency",
    Other => "other",
});

str_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    CheckedIn => "checked-in",
    InProgress => "in-progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(ExaminationStatus {
    InProgress => "in-progress",
    Completed => "completed",
});

str_enum!(PupilReaction {
    Normal => "normal",
    Sluggish => "sluggish",
    Fixed => "fixed",
});
