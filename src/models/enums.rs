//! Circulation status enums, stored as SMALLINT discriminants

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, Postgres,
};
use utoipa::ToSchema;

/// Maps an enum onto a Postgres SMALLINT column through its `i16` conversions
macro_rules! smallint_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> PgTypeInfo {
                <i16 as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
                let v: i16 = Decode::<Postgres>::decode(value)?;
                <$ty>::try_from(v).map_err(Into::into)
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <i16 as Encode<Postgres>>::encode(i16::from(*self), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// PhysicalCopyStatus
// ---------------------------------------------------------------------------

/// Availability of a physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum PhysicalCopyStatus {
    AtLibrary = 0,
    Requested = 1,
    InTransfer = 2,
}

impl TryFrom<i16> for PhysicalCopyStatus {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(PhysicalCopyStatus::AtLibrary),
            1 => Ok(PhysicalCopyStatus::Requested),
            2 => Ok(PhysicalCopyStatus::InTransfer),
            _ => Err(format!("Invalid physical copy status: {}", v)),
        }
    }
}

impl From<PhysicalCopyStatus> for i16 {
    fn from(s: PhysicalCopyStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for PhysicalCopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PhysicalCopyStatus::AtLibrary => "AtLibrary",
            PhysicalCopyStatus::Requested => "Requested",
            PhysicalCopyStatus::InTransfer => "InTransfer",
        };
        write!(f, "{}", label)
    }
}

smallint_column!(PhysicalCopyStatus);

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Status of a borrow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum RequestStatus {
    Pending = 0,
    Waiting = 1,
    Requested = 2,
    Returned = 3,
    NotReturned = 4,
    Canceled = 5,
}

impl RequestStatus {
    /// Returned and Canceled close a request for good
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Returned | RequestStatus::Canceled)
    }

    /// Discriminants of the statuses that count against a user's borrowing limit
    pub fn active_discriminants() -> [i16; 4] {
        [
            RequestStatus::Pending as i16,
            RequestStatus::Waiting as i16,
            RequestStatus::Requested as i16,
            RequestStatus::NotReturned as i16,
        ]
    }
}

impl TryFrom<i16> for RequestStatus {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(RequestStatus::Pending),
            1 => Ok(RequestStatus::Waiting),
            2 => Ok(RequestStatus::Requested),
            3 => Ok(RequestStatus::Returned),
            4 => Ok(RequestStatus::NotReturned),
            5 => Ok(RequestStatus::Canceled),
            _ => Err(format!("Invalid request status: {}", v)),
        }
    }
}

impl From<RequestStatus> for i16 {
    fn from(s: RequestStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Waiting => "Waiting",
            RequestStatus::Requested => "Requested",
            RequestStatus::Returned => "Returned",
            RequestStatus::NotReturned => "NotReturned",
            RequestStatus::Canceled => "Canceled",
        };
        write!(f, "{}", label)
    }
}

smallint_column!(RequestStatus);

// ---------------------------------------------------------------------------
// TransferStatus
// ---------------------------------------------------------------------------

/// Status of a transfer between two libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum TransferStatus {
    Pending = 0,
    Accepted = 1,
    Rejected = 2,
    Canceled = 3,
}

impl TryFrom<i16> for TransferStatus {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(TransferStatus::Pending),
            1 => Ok(TransferStatus::Accepted),
            2 => Ok(TransferStatus::Rejected),
            3 => Ok(TransferStatus::Canceled),
            _ => Err(format!("Invalid transfer status: {}", v)),
        }
    }
}

impl From<TransferStatus> for i16 {
    fn from(s: TransferStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransferStatus::Pending => "Pending",
            TransferStatus::Accepted => "Accepted",
            TransferStatus::Rejected => "Rejected",
            TransferStatus::Canceled => "Canceled",
        };
        write!(f, "{}", label)
    }
}

smallint_column!(TransferStatus);

// ---------------------------------------------------------------------------
// PunishmentLevel
// ---------------------------------------------------------------------------

/// Severity of a punishment, serialized as its number (1 to 5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum PunishmentLevel {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl TryFrom<i16> for PunishmentLevel {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(PunishmentLevel::One),
            2 => Ok(PunishmentLevel::Two),
            3 => Ok(PunishmentLevel::Three),
            4 => Ok(PunishmentLevel::Four),
            5 => Ok(PunishmentLevel::Five),
            _ => Err(format!("Punishment level must be between 1 and 5, got {}", v)),
        }
    }
}

impl From<PunishmentLevel> for i16 {
    fn from(l: PunishmentLevel) -> Self {
        l as i16
    }
}

impl std::fmt::Display for PunishmentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as i16)
    }
}

smallint_column!(PunishmentLevel);
