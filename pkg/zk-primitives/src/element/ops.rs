use crate::Element;

/// Implement a binary operation between two [`Element`]s
///
/// Arithmetic wraps on overflow, like the underlying [`U256`](ethnum::U256) in release builds
macro_rules! binop {
    ($trait:ident, $f:ident, $inner:ident) => {
        impl core::ops::$trait<Element> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: Element) -> Self::Output {
                Element(self.0.$inner(rhs.0))
            }
        }
    };
}

binop!(Add, add, wrapping_add);
binop!(Sub, sub, wrapping_sub);

macro_rules! bitop {
    ($trait:ident, $f:ident, $($t:tt)*) => {
        impl core::ops::$trait<Element> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: Element) -> Self::Output {
                Element(self.0 $($t)* rhs.0)
            }
        }
    };
}

bitop!(BitOr, bitor, |);
bitop!(BitAnd, bitand, &);

impl core::ops::Shl<u32> for Element {
    type Output = Element;

    #[inline]
    fn shl(self, rhs: u32) -> Self::Output {
        Element(self.0 << rhs)
    }
}

impl core::ops::Shr<u32> for Element {
    type Output = Element;

    #[inline]
    fn shr(self, rhs: u32) -> Self::Output {
        Element(self.0 >> rhs)
    }
}
