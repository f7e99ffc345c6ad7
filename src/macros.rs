//! Crate-local macros for implementing operators.
//!
//! Every macro takes the generic parameters of the impl in a leading bracket,
//! e.g. `[T: Scalar, const N: usize]`, followed by the operator trait and the
//! types involved.

/// Implements a binary operator for all four combinations of owned and
/// borrowed operands. The body is written once in terms of references.
macro_rules! impl_binop {
    (
        [$($gen:tt)*],
        $op:ident, $method:ident, $tl:ty, $tr:ty, $to:ty,
        |$lhs:ident, $rhs:ident| $body:block
    ) => {
        impl<'a, $($gen)*> ::std::ops::$op<&'a $tr> for &'a $tl {
            type Output = $to;

            #[inline]
            fn $method(self, rhs: &'a $tr) -> Self::Output {
                let $lhs = self;
                let $rhs = rhs;
                $body
            }
        }

        impl<$($gen)*> ::std::ops::$op<$tr> for &$tl {
            type Output = $to;

            #[inline]
            fn $method(self, rhs: $tr) -> Self::Output {
                self.$method(&rhs)
            }
        }

        impl<'a, $($gen)*> ::std::ops::$op<&'a $tr> for $tl {
            type Output = $to;

            #[inline]
            fn $method(self, rhs: &'a $tr) -> Self::Output {
                (&self).$method(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::$op<$tr> for $tl {
            type Output = $to;

            #[inline]
            fn $method(self, rhs: $tr) -> Self::Output {
                (&self).$method(&rhs)
            }
        }
    };
}

/// Implements a unary operator for an owned and a borrowed operand.
macro_rules! impl_unary_op {
    ([$($gen:tt)*], $op:ident, $method:ident, $t:ty, $to:ty, |$this:ident| $body:block) => {
        impl<$($gen)*> ::std::ops::$op for &$t {
            type Output = $to;

            #[inline]
            fn $method(self) -> Self::Output {
                let $this = self;
                $body
            }
        }

        impl<$($gen)*> ::std::ops::$op for $t {
            type Output = $to;

            #[inline]
            fn $method(self) -> Self::Output {
                (&self).$method()
            }
        }
    };
}

/// Implements a compound assignment operator for an owned and a borrowed
/// right hand side.
macro_rules! impl_binop_assign {
    ([$($gen:tt)*], $op:ident, $method:ident, $tl:ty, $tr:ty, |$lhs:ident, $rhs:ident| $body:block) => {
        impl<$($gen)*> ::std::ops::$op<&$tr> for $tl {
            #[inline]
            fn $method(&mut self, rhs: &$tr) {
                let $lhs = self;
                let $rhs = rhs;
                $body
            }
        }

        impl<$($gen)*> ::std::ops::$op<$tr> for $tl {
            #[inline]
            fn $method(&mut self, rhs: $tr) {
                self.$method(&rhs);
            }
        }
    };
}

/// Implements `scalar * value` for each listed primitive scalar type.
///
/// This can not be a blanket impl over `T: Scalar`, since the orphan rules
/// forbid implementing `Mul<Local<T>>` for an uncovered `T`.
macro_rules! impl_scalar_lhs_mul {
    (@one [$($gen:tt)*], $t:ident, [$($param:ident),*], $s:ty) => {
        impl_binop!([$($gen)*], Mul, mul, $s, $t<$s $(, $param)*>, $t<$s $(, $param)*>, |a, b| {
            b * *a
        });
    };
    (@each $gen:tt, $t:ident, $params:tt; $($s:ty),*) => {
        $(
            impl_scalar_lhs_mul!(@one $gen, $t, $params, $s);
        )*
    };
    ($gen:tt, $t:ident<_ $(, $param:ident)*>; $($s:ty),*) => {
        impl_scalar_lhs_mul!(@each $gen, $t, [$($param),*]; $($s),*);
    };
}

/// Implements [`approx::AbsDiffEq`] by delegating to the components, using
/// the epsilon type of the scalar.
macro_rules! impl_abs_diff_eq {
    ([$($gen:tt)*], $t:ty, |$arg1:ident, $arg2:ident, $arg3:ident| $body:block) => {
        impl<$($gen)*> ::approx::AbsDiffEq for $t
        where
            T: ::approx::AbsDiffEq,
            T::Epsilon: Copy,
        {
            type Epsilon = T::Epsilon;

            fn default_epsilon() -> Self::Epsilon {
                T::default_epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                let $arg1 = self;
                let $arg2 = other;
                let $arg3 = epsilon;
                $body
            }
        }
    };
}

/// Implements [`approx::RelativeEq`] by delegating to the components.
macro_rules! impl_relative_eq {
    ([$($gen:tt)*], $t:ty, |$arg1:ident, $arg2:ident, $arg3:ident, $arg4:ident| $body:block) => {
        impl<$($gen)*> ::approx::RelativeEq for $t
        where
            T: ::approx::RelativeEq,
            T::Epsilon: Copy,
        {
            fn default_max_relative() -> Self::Epsilon {
                T::default_max_relative()
            }

            fn relative_eq(
                &self,
                other: &Self,
                epsilon: Self::Epsilon,
                max_relative: Self::Epsilon,
            ) -> bool {
                let $arg1 = self;
                let $arg2 = other;
                let $arg3 = epsilon;
                let $arg4 = max_relative;
                $body
            }
        }
    };
}
