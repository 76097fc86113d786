#[macro_export]
macro_rules! scalar_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                Blob,
                Binary,
                set_family = Some($crate::SetFamily::BinarySet),
                is_numeric = false,
                is_keyable = false
            ),
            (
                Bool,
                Bool,
                set_family = None,
                is_numeric = false,
                is_keyable = false
            ),
            (
                Decimal,
                Number,
                set_family = Some($crate::SetFamily::NumberSet),
                is_numeric = true,
                is_keyable = true
            ),
            (
                Enum,
                String,
                set_family = Some($crate::SetFamily::StringSet),
                is_numeric = false,
                is_keyable = true
            ),
            (
                Float64,
                Number,
                set_family = Some($crate::SetFamily::NumberSet),
                is_numeric = true,
                is_keyable = false
            ),
            (
                Int,
                Number,
                set_family = Some($crate::SetFamily::NumberSet),
                is_numeric = true,
                is_keyable = true
            ),
            (
                Text,
                String,
                set_family = Some($crate::SetFamily::StringSet),
                is_numeric = false,
                is_keyable = true
            ),
            (
                Timestamp,
                String,
                set_family = Some($crate::SetFamily::StringSet),
                is_numeric = false,
                is_keyable = true
            ),
            (
                Uint,
                Number,
                set_family = Some($crate::SetFamily::NumberSet),
                is_numeric = true,
                is_keyable = true
            ),
            (
                Ulid,
                String,
                set_family = Some($crate::SetFamily::StringSet),
                is_numeric = false,
                is_keyable = true
            ),
        }
    };
}

#[macro_export]
macro_rules! scalar_kind_registry {
    ($macro:ident) => {
        $crate::scalar_kind_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::scalar_kind_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    ( @args $kind:expr; @entries $(
        (
            $scalar:ident,
            $wire:ident,
            set_family = $set_family:expr,
            is_numeric = $is_numeric:expr,
            is_keyable = $is_keyable:expr
        )
    ),* $(,)? ) => {
        match $kind {
            $(
                $crate::ScalarKind::$scalar => $crate::ScalarMetadata {
                    wire: $crate::WireFamily::$wire,
                    set_family: $set_family,
                    is_numeric: $is_numeric,
                    is_keyable: $is_keyable,
                },
            )*
        }
    };
}

macro_rules! label_from_registry {
    ( @args $kind:expr; @entries $(
        (
            $scalar:ident,
            $wire:ident,
            set_family = $set_family:expr,
            is_numeric = $is_numeric:expr,
            is_keyable = $is_keyable:expr
        )
    ),* $(,)? ) => {
        match $kind {
            $( $crate::ScalarKind::$scalar => stringify!($scalar), )*
        }
    };
}

macro_rules! all_kinds_from_registry {
    ( @entries $(
        (
            $scalar:ident,
            $wire:ident,
            set_family = $set_family:expr,
            is_numeric = $is_numeric:expr,
            is_keyable = $is_keyable:expr
        )
    ),* $(,)? ) => {
        [ $( $crate::ScalarKind::$scalar ),* ]
    };
}
