//! Integer and tolerance helpers shared by the lattice code.

/// Tolerance used for every coordinate comparison in the shape engine.
pub const EPSILON: f64 = 1.0e-7;

/// Greatest common divisor.
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Least common multiple, widened so large subdivisions cannot overflow.
pub fn lcm(a: u32, b: u32) -> u64 {
    let divisor = gcd(a, b);
    if divisor == 0 {
        return 0;
    }
    u64::from(a) * u64::from(b / divisor)
}

/// `true` when `a` and `b` differ by at most `tolerance`.
#[inline]
pub fn fuzzy_equals(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// First index in `[from, to)` where the monotone `predicate` holds, or `to`.
pub fn binary_search(mut from: i32, to: i32, mut predicate: impl FnMut(i32) -> bool) -> i32 {
    let mut len = to - from;
    while len > 0 {
        let half = len / 2;
        let middle = from + half;
        if predicate(middle) {
            len = half;
        } else {
            from = middle + 1;
            len -= half + 1;
        }
    }
    from
}

/// Floor to `i32`, saturating at the type bounds.
#[inline]
pub fn floor(value: f64) -> i32 {
    value.floor() as i32
}
