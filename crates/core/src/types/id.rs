//! Newtype IDs for type-safe entity references.
//!
//! Every identifier in the storefront is an opaque string: experience slugs
//! from the catalog, uuid cart ids, and ids minted by the payment gateway or
//! identity provider. Use the `define_id!` macro to create wrappers that
//! prevent accidentally mixing them up.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, `AsRef<str>` and `Borrow<str>`
///
/// `Borrow<str>` lets maps keyed by an ID be queried with a plain `&str`.
///
/// # Example
///
/// ```rust
/// # use slash_core::define_id;
/// define_id!(GiftId);
/// define_id!(VoucherId);
///
/// let gift = GiftId::new("g-1");
/// let voucher = VoucherId::new("g-1");
///
/// assert_eq!(gift.as_str(), voucher.as_str());
/// // These are different types, so this won't compile:
/// // let _: GiftId = voucher;
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Catalog identifier of a bookable experience.
    ExperienceId
);
define_id!(
    /// Identifier of a shopping cart (uuid v4, rotated after checkout).
    CartId
);
define_id!(
    /// Order identifier minted by the payment gateway.
    OrderId
);
define_id!(
    /// Payment identifier minted by the payment gateway.
    PaymentId
);
define_id!(
    /// Subject identifier issued by the identity provider.
    UserId
);
