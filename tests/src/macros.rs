/// Generates one `#[test]` per backend for each listed function.
///
/// Each function takes a `&mut DbTest` whose sources are created by that backend.
#[macro_export]
macro_rules! tests {
    (
        $(
            $( #[$attrs:meta] )*
            $f:ident
        ),+ $(,)?
    ) => {
        mod interpreter {
            $(
                #[test]
                $( #[$attrs] )*
                fn $f() {
                    let mut test = $crate::DbTest::new($crate::SetupInterpreter::new());
                    super::$f(&mut test);
                }
            )*
        }

        mod sqlite {
            $(
                #[test]
                $( #[$attrs] )*
                fn $f() {
                    let mut test = $crate::DbTest::new($crate::SetupSqlite::new());
                    super::$f(&mut test);
                }
            )*
        }

        mod memory {
            $(
                #[test]
                $( #[$attrs] )*
                fn $f() {
                    let mut test = $crate::DbTest::new($crate::SetupMemory::new());
                    super::$f(&mut test);
                }
            )*
        }
    };
}

/// Asserts two lists hold the same elements, ignoring order.
#[macro_export]
macro_rules! assert_eq_unordered {
    ($actual:expr, $expect:expr) => {{
        let mut actual = $actual.into_list().unwrap();
        let mut expect = $expect.into_list().unwrap();
        actual.sort_by(|a, b| a.total_cmp(b));
        expect.sort_by(|a, b| a.total_cmp(b));
        pretty_assertions::assert_eq!(actual, expect);
    }};
}
