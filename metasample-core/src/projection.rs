//! Scalar projections used for distance computation.
//!
//! A projection maps a domain value to a single numeric coordinate. The
//! samplers never look at values directly; they only compare projected
//! coordinates.

/// Map a value of type `T` to a numeric coordinate.
pub trait Projection<T: ?Sized> {
    fn project(&self, value: &T) -> f64;
}

impl<T: ?Sized, F> Projection<T> for F
where
    F: Fn(&T) -> f64,
{
    fn project(&self, value: &T) -> f64 {
        self(value)
    }
}

/// Projection for primitive numeric values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericProjection;

macro_rules! numeric_projection {
    ($($ty:ty),*) => {
        $(
            impl Projection<$ty> for NumericProjection {
                fn project(&self, value: &$ty) -> f64 {
                    *value as f64
                }
            }
        )*
    };
}

numeric_projection!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

/// Projection for textual inputs.
///
/// Text that parses as a finite number projects to that number; anything
/// else (including `"nan"` and `"inf"`) projects to its character count.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseProjection;

impl Projection<str> for ParseProjection {
    fn project(&self, value: &str) -> f64 {
        match value.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => number,
            _ => value.chars().count() as f64,
        }
    }
}

impl Projection<String> for ParseProjection {
    fn project(&self, value: &String) -> f64 {
        self.project(value.as_str())
    }
}

/// Manhattan distance between two coordinate pairs.
pub fn manhattan(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}
