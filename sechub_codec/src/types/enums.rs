//! Wire enumerations
//!
//! Each enumeration serializes as its API string. Strings the API may add
//! later land in `Other` so API-originated values always survive a round trip.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Value not known to this version of the codec
            Other(String),
        }

        impl $name {
            /// Wire strings known to this version
            pub const KNOWN: &'static [&'static str] = &[$($wire),+];

            pub fn parse(s: &str) -> Self {
                match s {
                    $($wire => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(s) => s.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::parse(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::parse(&s))
            }
        }
    };
}

wire_enum! {
    /// Comparison for string filters
    StringFilterComparison {
        Equals => "EQUALS",
        Prefix => "PREFIX",
        NotEquals => "NOT_EQUALS",
        PrefixNotEquals => "PREFIX_NOT_EQUALS",
        Contains => "CONTAINS",
        NotContains => "NOT_CONTAINS",
    }
}

wire_enum! {
    /// Comparison for key/value map filters
    MapFilterComparison {
        Equals => "EQUALS",
        NotEquals => "NOT_EQUALS",
        Contains => "CONTAINS",
        NotContains => "NOT_CONTAINS",
    }
}

wire_enum! {
    DateRangeUnit {
        Days => "DAYS",
    }
}

wire_enum! {
    /// Whether a control parameter uses the service default or a custom value
    ParameterValueType {
        Default => "DEFAULT",
        Custom => "CUSTOM",
    }
}

wire_enum! {
    AssociationStatus {
        Enabled => "ENABLED",
        Disabled => "DISABLED",
    }
}

wire_enum! {
    RuleStatus {
        Enabled => "ENABLED",
        Disabled => "DISABLED",
    }
}

wire_enum! {
    WorkflowStatus {
        New => "NEW",
        Notified => "NOTIFIED",
        Resolved => "RESOLVED",
        Suppressed => "SUPPRESSED",
    }
}

wire_enum! {
    SeverityLabel {
        Informational => "INFORMATIONAL",
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

wire_enum! {
    VerificationState {
        Unknown => "UNKNOWN",
        TruePositive => "TRUE_POSITIVE",
        FalsePositive => "FALSE_POSITIVE",
        BenignPositive => "BENIGN_POSITIVE",
    }
}

wire_enum! {
    AutomationRulesActionType {
        FindingFieldsUpdate => "FINDING_FIELDS_UPDATE",
    }
}
