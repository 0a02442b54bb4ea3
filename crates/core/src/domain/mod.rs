// Domain Layer - Pure business logic and entities

/// Declares a fieldless enum stored and transmitted as a snake_case string.
///
/// Generates `as_str`, `Display`, `FromStr` and an `ALL` table so every
/// string mapping is defined exactly once.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::DomainError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => Err($crate::domain::DomainError::unknown($kind, other)),
                }
            }
        }
    };
}

pub mod agreement;
pub mod approval;
pub mod engagement;
pub mod error;
pub mod profile;
pub mod review;
pub mod stream;
pub mod venture;

/// Entity identifier (UUID v4)
pub type EntityId = String;

/// Timestamp in epoch milliseconds
pub type Millis = i64;

// Re-exports
pub use agreement::{
    support_hours_for, total_support_hours, Agreement, AgreementStatus, STANDARD_TERMS,
};
pub use approval::{chain_roles_for_tier, ApprovalChainItem, ApprovalStatus, ChainVerdict};
pub use engagement::{
    EngagementAction, EngagementLog, MentorRequest, MentorRequestStatus, Session, SessionSummary,
    SessionType,
};
pub use error::DomainError;
pub use profile::{Profile, Role};
pub use review::{ApplicationAssessment, ApplicationReview, JobsImpact, ReviewDecision, TriageOutcome};
pub use stream::{
    apply_deliverable_status, DeliverableStatus, RagStatus, StreamDefinition, StreamDeliverable, StreamSelfStatus,
    SupportType, VentureStream, DELIVERABLES_PER_STREAM, STREAM_DEFINITIONS,
};
pub use venture::{ApplicationSource, Venture, VentureStatus, VentureTier};
