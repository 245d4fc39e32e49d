#[macro_export]
macro_rules! assert_matches {
    ($a:expr => $b:pat) => {
        assert!(match $a {
            $b => true,
            _ => false,
        });
    };
    ($a:expr => $b:pat,) => {
        $crate::assert_matches!($a => $b)
    };
}
