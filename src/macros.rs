/// Build a `Default` value of some type, overriding a handful of its fields
#[macro_export]
macro_rules! new_t {
    ($t:ty, $($k:ident = $v:expr),+ $(,)?) => {{
        let mut c = <$t>::default();
        $(c.$k = $v;)+
        c
    }};
    ($($k:ident = $v:expr),+ $(,)?) => {new_t!(T, $($k = $v,)+)};
}

/// Generate one test per listed type, with `T` aliased to that type inside the body
#[macro_export]
macro_rules! test_t {
  ( #[should_panic(expected = $panic_msg:literal)]
    $name:ident[T: $($impl:ty)|*]() $body:tt ) => {$(
      ::paste::paste! {
          #[test]
          #[should_panic(expected = $panic_msg)]
          fn [<$name _ $impl:snake>]() {
            type T=$impl;
            $body
          }
      }
  )+};
  ($name:ident[T: $($impl:ty)|*]() $body:tt ) => {$(
      ::paste::paste! {
          #[test]
          fn [<test_ $name _ $impl:snake>]() {
            type T=$impl;
            $body
          }
      }
  )+};
}

#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr) => {
        assert!(
            ($l - $r).abs() < f64::EPSILON,
            "assertion failed: {} !~ {}",
            $l,
            $r
        )
    };
    ($l:expr, $r:expr, tolerance = $t:expr) => {
        assert!(
            ($l - $r).abs() < $t,
            "assertion failed: {} !~ {} (tolerance {})",
            $l,
            $r,
            $t
        )
    };
    ($l:expr, $r:expr, $msg:expr) => {
        assert!(
            ($l - $r).abs() < f64::EPSILON,
            "assertion failed: {} !~ {}: {}",
            $l,
            $r,
            $msg
        )
    };
}

/// Compare two f64 slices elementwise, within 1e-5 unless told otherwise
#[macro_export]
macro_rules! assert_slice_approx {
    ($l:expr, $r:expr) => {
        $crate::assert_slice_approx!($l, $r, tolerance = 1e-5)
    };
    ($l:expr, $r:expr, tolerance = $t:expr) => {
        match (&$l, &$r) {
            (l, r) => {
                let (l, r): (&[f64], &[f64]) = (&l[..], &r[..]);
                assert_eq!(l.len(), r.len(), "length mismatch: {:?} !~ {:?}", l, r);
                for (idx, (a, b)) in l.iter().zip(r.iter()).enumerate() {
                    assert!(
                        (a - b).abs() < $t,
                        "assertion failed at {}: {:?} !~ {:?}",
                        idx,
                        l,
                        r
                    );
                }
            }
        }
    };
}
