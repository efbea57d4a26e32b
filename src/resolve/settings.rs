//! Structured settings objects
//!
//! A settings type exposes its string fields through [`Settings::fields_mut`],
//! an ordered list of `(name, &mut String)` pairs. The resolver reads each
//! value through the reference and writes the secret back through it.
//!
//! The [`impl_settings!`](crate::impl_settings) macro derives the trait for
//! plain structs:
//!
//! ```
//! use vaultref::impl_settings;
//! use vaultref::resolve::Settings;
//!
//! struct AppSettings {
//!     database_url: String,
//!     api_key: String,
//!     retries: u32,
//! }
//!
//! impl_settings!(AppSettings { database_url, api_key });
//!
//! let mut settings = AppSettings {
//!     database_url: "postgres://localhost".to_string(),
//!     api_key: "key".to_string(),
//!     retries: 3,
//! };
//! let names: Vec<_> = settings.fields_mut().iter().map(|f| f.name).collect();
//! assert_eq!(names, ["database_url", "api_key"]);
//! ```

/// One string field of a settings object
#[derive(Debug)]
pub struct SettingField<'a> {
    /// Declared field name
    pub name: &'static str,

    /// Current value, assignable in place
    pub value: &'a mut String,
}

impl<'a> SettingField<'a> {
    /// Create a field entry
    pub fn new(name: &'static str, value: &'a mut String) -> Self {
        Self { name, value }
    }
}

/// A settings object whose string fields can be enumerated and assigned
pub trait Settings {
    /// The string fields, in declaration order
    fn fields_mut(&mut self) -> Vec<SettingField<'_>>;
}

/// Implement [`Settings`](crate::resolve::Settings) for a struct by listing
/// its `String` fields
#[macro_export]
macro_rules! impl_settings {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::resolve::Settings for $ty {
            fn fields_mut(&mut self) -> ::std::vec::Vec<$crate::resolve::SettingField<'_>> {
                ::std::vec![
                    $( $crate::resolve::SettingField::new(stringify!($field), &mut self.$field) ),*
                ]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Example {
        first: String,
        second: String,
    }

    crate::impl_settings!(Example { first, second });

    #[test]
    fn test_fields_in_declaration_order() {
        let mut example = Example {
            first: "1".to_string(),
            second: "2".to_string(),
        };

        let fields = example.fields_mut();
        let pairs: Vec<_> = fields.iter().map(|f| (f.name, f.value.as_str())).collect();
        assert_eq!(pairs, vec![("first", "1"), ("second", "2")]);
    }

    #[test]
    fn test_assignment_through_field() {
        let mut example = Example {
            first: "1".to_string(),
            second: "2".to_string(),
        };

        for field in example.fields_mut() {
            if field.name == "second" {
                *field.value = "changed".to_string();
            }
        }

        assert_eq!(example.first, "1");
        assert_eq!(example.second, "changed");
    }
}
