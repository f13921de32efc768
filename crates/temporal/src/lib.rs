#![allow(non_snake_case)]

//! Fixed-precision SQL temporal types and arithmetic.
//!
//! The value types are [Time], [Timestamp], [Date], the zone-carrying
//! [TimeWithTimeZone] and [TimestampWithTimeZone], and the interval types
//! [ShortInterval] and [LongInterval].  TIME and TIMESTAMP values carry a
//! declared precision in `0..=12` fractional-second digits over a
//! picosecond-of-day representation; changing the precision rounds half-up
//! and keeps the representation zero-padded below the declared digits.
//!
//! The [arith] module is the arithmetic engine (`date_add`, `date_diff`,
//! `date_trunc`, `extract`), [format] is the pattern-driven parse/format
//! surface, and [session] carries the query clock for `CURRENT_DATE` and
//! friends.
//!
//! Scalar functions come in nullable variants generated by the macro family
//! below: for a function `f_Type`, `f_TypeN` accepts and returns `Option`,
//! following the convention that a SQL function returns NULL when any
//! argument is NULL.

pub mod arith;
pub mod date;
pub mod error;
pub mod format;
pub mod interval;
pub mod session;
pub mod time;
pub mod timestamp;
pub mod zoned;

pub use date::Date;
pub use error::{SqlResult, SqlRuntimeError};
pub use interval::{LongInterval, ShortInterval};
pub use session::Session;
pub use time::{Time, MAX_TIME_PRECISION};
pub use timestamp::Timestamp;
pub use zoned::{TimeWithTimeZone, TimeZoneId, TimestampWithTimeZone};

// Macro to create variants of a function with 1 argument
// If there exists a function is f_(x: T) -> S, this creates a function
// fN(x: Option<T>) -> Option<S>, defined as
// fN(x) { let x = x?; Some(f_(x)) }.
macro_rules! some_function1 {
    ($func_name:ident, $arg_type:ty, $ret_type:ty) => {
        ::paste::paste! {
            #[doc(hidden)]
            pub fn [<$func_name N>]( arg: Option<$arg_type> ) -> Option<$ret_type> {
                let arg = arg?;
                Some([<$func_name _>](arg))
            }
        }
    };
}

pub(crate) use some_function1;

// Macro to create variants of a function with 1 argument
// If there exists a function is f_type(x: T) -> S, this creates a function
// f_typeN(x: Option<T>) -> Option<S>
// { let x = x?; Some(f_type(x)) }.
macro_rules! some_polymorphic_function1 {
    ($func_name:ident, $type_name: ident, $arg_type:ty, $ret_type:ty) => {
        ::paste::paste! {
            #[doc(hidden)]
            pub fn [<$func_name _ $type_name N>]( arg: Option<$arg_type> ) -> Option<$ret_type> {
                let arg = arg?;
                Some([<$func_name _ $type_name >](arg))
            }
        }
    };
}

pub(crate) use some_polymorphic_function1;

// Macro to create variants of a polymorphic function with 2 arguments
// If there exists a function is f_type1_type2(x: T, y: S) -> U, this
// creates three functions:
// - f_type1_type2N(x: T, y: Option<S>) -> Option<U>
// - f_type1N_type2(x: Option<T>, y: S) -> Option<U>
// - f_type1N_type2N(x: Option<T>, y: Option<S>) -> Option<U>
// The resulting functions return Some only if all arguments are 'Some'.
macro_rules! some_polymorphic_function2 {
    ($func_name:ident, $type_name0: ident, $arg_type0:ty, $type_name1: ident, $arg_type1:ty, $ret_type:ty) => {
        ::paste::paste! {
            #[doc(hidden)]
            pub fn [<$func_name _$type_name0 _ $type_name1 N>]( arg0: $arg_type0, arg1: Option<$arg_type1> ) -> Option<$ret_type> {
                let arg1 = arg1?;
                Some([<$func_name _ $type_name0 _ $type_name1>](arg0, arg1))
            }

            #[doc(hidden)]
            pub fn [<$func_name _ $type_name0 N _ $type_name1>]( arg0: Option<$arg_type0>, arg1: $arg_type1 ) -> Option<$ret_type> {
                let arg0 = arg0?;
                Some([<$func_name _ $type_name0 _ $type_name1>](arg0, arg1))
            }

            #[doc(hidden)]
            pub fn [<$func_name _ $type_name0 N _ $type_name1 N>]( arg0: Option<$arg_type0>, arg1: Option<$arg_type1> ) -> Option<$ret_type> {
                let arg0 = arg0?;
                let arg1 = arg1?;
                Some([<$func_name _ $type_name0 _ $type_name1>](arg0, arg1))
            }
        }
    }
}

pub(crate) use some_polymorphic_function2;

#[cfg(test)]
mod test {
    use crate::arith::{extract_hour_TimeN, last_day_of_month_DateN};
    use crate::format::from_unixtimeN;
    use crate::{Date, Time};

    #[test]
    fn null_lifting() {
        assert_eq!(extract_hour_TimeN(None), None);
        assert_eq!(
            extract_hour_TimeN(Some(Time::parse("12:34:56").unwrap())),
            Some(12)
        );
        assert_eq!(last_day_of_month_DateN(None), None);
        assert_eq!(from_unixtimeN(None), None);
        assert_eq!(
            last_day_of_month_DateN(Some(Date::parse("2024-02-01").unwrap())),
            Some(Date::parse("2024-02-29").unwrap())
        );
    }
}
