//! Newtype IDs for type-safe entity references.
//!
//! Backend rows are keyed by UUIDs. Use the `define_id!` macro to create
//! wrappers that prevent accidentally mixing IDs from different tables.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `uuid::Uuid` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `Display` and `FromStr` using the hyphenated form
/// - `From<Uuid>` conversion
///
/// # Example
///
/// ```rust
/// # use lummi_core::define_id;
/// define_id!(LeadId);
/// define_id!(TestimonialId);
///
/// let lead_id: LeadId = "7b0c6f2e-3f55-4d2b-9c1a-0d8f2f1f4a11".parse().unwrap();
/// assert_eq!(lead_id.to_string(), "7b0c6f2e-3f55-4d2b-9c1a-0d8f2f1f4a11");
///
/// // These are different types, so this won't compile:
/// // let _: TestimonialId = lead_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(LeadId);
define_id!(PortfolioItemId);
define_id!(TestimonialId);
define_id!(UserId);
