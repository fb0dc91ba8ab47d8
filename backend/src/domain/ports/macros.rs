//! `define_port_error!`: declares an adapter error enum for a driven port.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! parameters accept anything convertible into the field type, so adapters can
//! write `CourseRepositoryError::query("timeout")`.
//!
//! The `store` form declares the four failure shapes shared by every
//! repository port: `Connection`, `Query`, `Duplicate` and `Transaction`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        store $name:ident => $label:literal
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// Store connection could not be obtained.
            #[error("{store} connection failed: {message}", store = $label)]
            Connection { message: String },
            /// Query or mutation failed during execution.
            #[error("{store} query failed: {message}", store = $label)]
            Query { message: String },
            /// A unique index rejected the write.
            #[error("{store} rejected duplicate {field}: {value}", store = $label)]
            Duplicate { field: String, value: String },
            /// The surrounding transaction rolled back.
            #[error("{store} transaction failed: {message}", store = $label)]
            Transaction { message: String },
        }

        impl $name {
            define_port_error!(@ctor Connection { message: String });
            define_port_error!(@ctor Query { message: String });
            define_port_error!(@ctor Duplicate { field: String, value: String });
            define_port_error!(@ctor Transaction { message: String });
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;
