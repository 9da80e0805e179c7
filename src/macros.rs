pub use enclose::*;

#[macro_export]
macro_rules! object {
    () => {
        $crate::Value::Object(::std::collections::BTreeMap::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = ::std::collections::BTreeMap::new();
        $( fields.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        $crate::Value::Object(fields)
    }};
}

#[macro_export]
macro_rules! array {
    ($($value:expr),* $(,)?) => {
        $crate::Value::Array(::std::vec![$($crate::Value::from($value)),*])
    };
}

#[macro_export]
macro_rules! observe {
    (( $($d_tt:tt)* ) => $getter:expr, $callback:expr $(,)?) => {
        $crate::observe($crate::macros::enclose!(($( $d_tt )*) move || $getter), $callback)
    };
    (=> $getter:expr, $callback:expr $(,)?) => {
        $crate::observe(move || $getter, $callback)
    };
}
