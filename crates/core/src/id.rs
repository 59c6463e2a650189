//! UUID-backed identifier support shared by domain crates.

/// Define a strongly-typed UUID newtype identifier.
///
/// Generates: `new()` (UUIDv7, time-ordered — prefer passing IDs explicitly
/// in tests for determinism), `from_uuid`/`as_uuid`, `Display`, `From`
/// conversions, and a `FromStr` that fails with `DomainError::InvalidId`.
#[macro_export]
macro_rules! impl_uuid_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<uuid::Uuid> for $t {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for uuid::Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::error::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = <uuid::Uuid as core::str::FromStr>::from_str(s).map_err(|e| {
                    $crate::error::DomainError::invalid_id(format!("{}: {}", $name, e))
                })?;
                Ok(Self(uuid))
            }
        }
    };
}
