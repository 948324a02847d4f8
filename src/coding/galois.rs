//! Arithmetic over GF(2<sup>6</sup>) codewords and bounded-degree polynomials of them.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Deref, DerefMut, Div, Mul, Sub};

use collect_slice::CollectSlice;

/// GF(2<sup>6</sup>) generated by h(x) = x<sup>6</sup> + x + 1.
#[derive(Copy, Clone, Debug)]
pub struct P25Field;

/// Codeword α<sup>i</sup> for each power i, as the bits of x<sup>i</sup> mod h(x).
const CODEWORDS: [u8; 63] = [
    0o01, 0o02, 0o04, 0o10, 0o20, 0o40, 0o03, 0o06, 0o14, 0o30, 0o60, 0o43, 0o05, 0o12,
    0o24, 0o50, 0o23, 0o46, 0o17, 0o36, 0o74, 0o73, 0o65, 0o51, 0o21, 0o42, 0o07, 0o16,
    0o34, 0o70, 0o63, 0o45, 0o11, 0o22, 0o44, 0o13, 0o26, 0o54, 0o33, 0o66, 0o57, 0o35,
    0o72, 0o67, 0o55, 0o31, 0o62, 0o47, 0o15, 0o32, 0o64, 0o53, 0o25, 0o52, 0o27, 0o56,
    0o37, 0o76, 0o77, 0o75, 0o71, 0o61, 0o41,
];

/// Power i of each nonzero codeword, indexed by codeword bits minus one.
const POWERS: [usize; 63] = [
    0, 1, 6, 2, 12, 7, 26, 3, 32, 13, 35, 8, 48, 27, 18, 4, 24, 33, 16, 14, 52, 36, 54,
    9, 45, 49, 38, 28, 41, 19, 56, 5, 62, 25, 11, 34, 31, 17, 47, 15, 23, 53, 51, 37,
    44, 55, 40, 10, 61, 46, 30, 50, 22, 39, 43, 29, 60, 42, 21, 20, 59, 57, 58,
];

impl GaloisField for P25Field {
    fn size() -> usize { 63 }
    fn valid_codeword(bits: u8) -> bool { bits >> 6 == 0 }
    fn codeword(pow: usize) -> u8 { CODEWORDS[pow] }
    fn power(codeword: usize) -> usize { POWERS[codeword] }
}

/// Codeword in the P25 field.
pub type P25Codeword = Codeword<P25Field>;

/// A GF(2<sup>r</sup>) field described by its power/codeword tables.
pub trait GaloisField {
    /// Number of nonzero codewords: 2<sup>r</sup> - 1.
    fn size() -> usize;
    /// Whether the bit pattern fits in the field.
    fn valid_codeword(bits: u8) -> bool;
    /// Map power i to the bits of α<sup>i</sup>, for i < size.
    fn codeword(pow: usize) -> u8;
    /// Map the zero-based index of a nonzero codeword to its power.
    fn power(codeword: usize) -> usize;

    /// Map any power i to the bits of α<sup>i mod size</sup>.
    fn codeword_modded(pow: usize) -> u8 {
        Self::codeword(pow % Self::size())
    }
}

/// Element of a Galois field.
#[derive(Copy, Clone)]
pub struct Codeword<F: GaloisField> {
    field: PhantomData<F>,
    bits: u8,
}

impl<F: GaloisField> Codeword<F> {
    /// Wrap the given bit pattern. Panic if it doesn't fit in the field.
    pub fn new(bits: u8) -> Codeword<F> {
        assert!(F::valid_codeword(bits));

        Codeword {
            field: PhantomData,
            bits,
        }
    }

    /// Construct α<sup>i</sup> for the given power i, reduced modulo the field.
    pub fn for_power(power: usize) -> Codeword<F> {
        Codeword::new(F::codeword_modded(power))
    }

    /// Bit pattern of the codeword.
    pub fn bits(&self) -> u8 { self.bits }

    /// Whether this is the additive identity.
    pub fn zero(&self) -> bool { self.bits == 0 }

    /// Power i of α<sup>i</sup>, or `None` for the zero codeword.
    pub fn power(&self) -> Option<usize> {
        if self.zero() {
            None
        } else {
            Some(F::power(self.bits as usize - 1))
        }
    }

    /// Multiplicative inverse. Panic on zero.
    pub fn invert(self) -> Codeword<F> {
        match self.power() {
            Some(p) => Codeword::for_power(F::size() - p),
            None => panic!("invert zero"),
        }
    }

    /// Raise the codeword to the given power.
    pub fn pow(&self, pow: usize) -> Codeword<F> {
        match self.power() {
            Some(p) => Codeword::for_power(p * pow),
            None => Codeword::default(),
        }
    }
}

impl<F: GaloisField> Default for Codeword<F> {
    /// The zero codeword.
    fn default() -> Self {
        Codeword::new(0)
    }
}

impl<F: GaloisField> Add for Codeword<F> {
    type Output = Codeword<F>;

    fn add(self, rhs: Codeword<F>) -> Self::Output {
        Codeword::new(self.bits ^ rhs.bits)
    }
}

/// Subtraction is addition in characteristic 2.
impl<F: GaloisField> Sub for Codeword<F> {
    type Output = Codeword<F>;

    fn sub(self, rhs: Codeword<F>) -> Self::Output {
        self + rhs
    }
}

impl<F: GaloisField> Mul for Codeword<F> {
    type Output = Codeword<F>;

    fn mul(self, rhs: Codeword<F>) -> Self::Output {
        match (self.power(), rhs.power()) {
            (Some(p), Some(q)) => Codeword::for_power(p + q),
            _ => Codeword::default(),
        }
    }
}

/// Panic on division by zero.
impl<F: GaloisField> Div for Codeword<F> {
    type Output = Codeword<F>;

    fn div(self, rhs: Codeword<F>) -> Self::Output {
        match (self.power(), rhs.power()) {
            (Some(p), Some(q)) => Codeword::for_power(F::size() + p - q),
            (None, Some(_)) => Codeword::default(),
            (_, None) => panic!("divide by zero"),
        }
    }
}

impl<F: GaloisField> PartialEq for Codeword<F> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<F: GaloisField> Eq for Codeword<F> {}

impl<F: GaloisField> PartialEq<u8> for Codeword<F> {
    fn eq(&self, other: &u8) -> bool {
        self.bits == *other
    }
}

impl<F: GaloisField> fmt::Debug for Codeword<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.power() {
            Some(p) => write!(f, "α^{}", p),
            None => write!(f, "0"),
        }
    }
}

/// Fixed-size coefficient storage for the polynomials of one code.
pub trait PolynomialCoefs: Default + Copy + Clone +
    Deref<Target = [P25Codeword]> + DerefMut
{
    /// Minimum Hamming distance d of the (n, k, d) code.
    fn distance() -> usize;

    /// Correctable symbol errors t = floor(d / 2).
    fn errors() -> usize {
        Self::distance() / 2
    }

    /// Number of syndromes, 2t.
    fn syndromes() -> usize { 2 * Self::errors() }

    /// Check the storage can hold the decoding polynomials.
    fn validate(&self) {
        assert!(Self::distance() % 2 == 1);
        assert!(self.len() >= Self::syndromes());
    }
}

/// Declare a coefficient storage type for a code of the given distance, sized either
/// for the Berlekamp-Massey polynomials (distance + 1) or explicitly.
macro_rules! impl_polynomial_coefs {
    ($name:ident, $dist:expr) => {
        impl_polynomial_coefs!($name, $dist, $dist + 1);
    };
    ($name:ident, $dist:expr, $len:expr) => {
        #[derive(Copy, Clone)]
        pub struct $name([$crate::coding::galois::P25Codeword; $len]);

        impl $crate::coding::galois::PolynomialCoefs for $name {
            fn distance() -> usize { $dist }
        }

        impl Default for $name {
            fn default() -> Self {
                $name([$crate::coding::galois::P25Codeword::default(); $len])
            }
        }

        impl std::ops::Deref for $name {
            type Target = [$crate::coding::galois::P25Codeword];
            fn deref(&self) -> &Self::Target { &self.0[..] }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0[..] }
        }
    };
}

/// Polynomial c<sub>0</sub> + c<sub>1</sub>x + ··· with codeword coefficients.
///
/// Terms past the storage size are silently dropped, so products are computed modulo
/// x<sup>n</sup> for storage size n.
#[derive(Copy, Clone)]
pub struct Polynomial<P: PolynomialCoefs> {
    coefs: P,
    /// Storage index of the degree-0 term. Everything before it is zero.
    start: usize,
}

impl<P: PolynomialCoefs> Polynomial<P> {
    /// Construct from the coefficients c<sub>0</sub>, c<sub>1</sub>, ... in order.
    pub fn new<T: Iterator<Item = P25Codeword>>(mut init: T) -> Self {
        let mut coefs = P::default();
        init.collect_slice_exhaust(&mut coefs[..]);

        Polynomial { coefs, start: 0 }
    }

    /// Construct x<sup>n</sup>.
    pub fn unit_power(n: usize) -> Self {
        let mut coefs = P::default();
        coefs[n] = Codeword::for_power(0);

        Polynomial { coefs, start: 0 }
    }

    /// Degree-0 coefficient.
    pub fn constant(&self) -> P25Codeword {
        self.coefs[self.start]
    }

    /// Degree of the polynomial, or `None` for p(x) = 0.
    pub fn degree(&self) -> Option<usize> {
        self.coefs.iter()
            .enumerate()
            .rev()
            .find(|&(_, coef)| !coef.zero())
            .map(|(deg, _)| deg - self.start)
    }

    /// Divide by x in O(1). Panic if the constant term is nonzero.
    pub fn shift(mut self) -> Polynomial<P> {
        assert!(self.constant().zero());

        self.start += 1;
        self
    }

    fn get(&self, idx: usize) -> P25Codeword {
        self.coefs.get(idx).cloned().unwrap_or_default()
    }

    /// Coefficient of x<sup>i</sup>, zero past the degree.
    pub fn coef(&self, i: usize) -> P25Codeword {
        self.get(self.start + i)
    }

    /// Evaluate p(x) at the given point with Horner's method.
    pub fn eval(&self, x: P25Codeword) -> P25Codeword {
        self.iter().rev().fold(P25Codeword::default(), |s, &coef| s * x + coef)
    }

    /// Drop every term of degree greater than the given degree.
    pub fn truncate(mut self, deg: usize) -> Polynomial<P> {
        for i in (self.start + deg + 1)..self.coefs.len() {
            self.coefs[i] = P25Codeword::default();
        }

        self
    }

    /// Formal derivative. Only odd-degree terms survive in characteristic 2.
    pub fn deriv(mut self) -> Polynomial<P> {
        for i in self.start..self.coefs.len() {
            self.coefs[i] = if (i - self.start) % 2 == 0 {
                self.get(i + 1)
            } else {
                P25Codeword::default()
            };
        }

        self
    }
}

impl<P: PolynomialCoefs> Default for Polynomial<P> {
    fn default() -> Self {
        Polynomial::new(std::iter::empty())
    }
}

/// Coefficients from the degree-0 term up.
impl<P: PolynomialCoefs> Deref for Polynomial<P> {
    type Target = [P25Codeword];
    fn deref(&self) -> &Self::Target { &self.coefs[self.start..] }
}

impl<P: PolynomialCoefs> DerefMut for Polynomial<P> {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.coefs[self.start..] }
}

impl<P: PolynomialCoefs> Add for Polynomial<P> {
    type Output = Polynomial<P>;

    fn add(mut self, rhs: Polynomial<P>) -> Self::Output {
        // Rebase to index 0; start >= 0 so coef(i) reads at or after i.
        for i in 0..self.coefs.len() {
            self.coefs[i] = self.coef(i) + rhs.coef(i);
        }

        self.start = 0;
        self
    }
}

impl<P: PolynomialCoefs> Mul<P25Codeword> for Polynomial<P> {
    type Output = Polynomial<P>;

    fn mul(mut self, rhs: P25Codeword) -> Self::Output {
        for coef in self.coefs.iter_mut() {
            *coef = *coef * rhs;
        }

        self
    }
}

impl<P: PolynomialCoefs> Mul<Polynomial<P>> for Polynomial<P> {
    type Output = Polynomial<P>;

    fn mul(self, rhs: Polynomial<P>) -> Self::Output {
        let mut out = Polynomial::<P>::default();

        for (i, &coef) in self.iter().enumerate() {
            for (j, &mult) in rhs.iter().enumerate() {
                if let Some(c) = out.coefs.get_mut(i + j) {
                    *c = *c + coef * mult;
                }
            }
        }

        out
    }
}

impl<P: PolynomialCoefs> fmt::Debug for Polynomial<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Polynomial({:?})", &self[..])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    impl_polynomial_coefs!(TestCoefs, 23, 24);
    type TestPolynomial = Polynomial<TestCoefs>;

    #[test]
    fn test_tables() {
        for pow in 0..63 {
            let c = P25Codeword::for_power(pow);
            assert_eq!(c.power(), Some(pow));
        }

        assert_eq!(P25Codeword::for_power(6), 0b000011);
        assert_eq!(P25Codeword::for_power(63), 0b000001);
    }

    #[test]
    fn test_coefs() {
        assert_eq!(TestCoefs::errors(), 11);
        assert_eq!(TestCoefs::syndromes(), 22);
        TestCoefs::default().validate();
    }

    #[test]
    fn test_arith() {
        assert_eq!(P25Codeword::new(0b100001) + P25Codeword::new(0b110100), 0b010101);
        assert_eq!(P25Codeword::new(0b100001) - P25Codeword::new(0b100001), 0);
        assert_eq!(P25Codeword::new(0b000110) * P25Codeword::new(0b000101), 0b011110);
        assert_eq!(P25Codeword::new(0b100001) * P25Codeword::new(0b000010), 0b000001);
        assert_eq!(P25Codeword::new(0) * P25Codeword::new(0b000101), 0);
        assert_eq!(P25Codeword::new(0b001000) / P25Codeword::new(0b000101), 0b010111);
        assert_eq!(P25Codeword::new(0b011110) / P25Codeword::new(0b011110), 0b000001);
        assert_eq!(P25Codeword::for_power(62).pow(10).power(), Some(53));
        assert_eq!(P25Codeword::for_power(17).invert() * P25Codeword::for_power(17),
                   P25Codeword::for_power(0));
    }

    #[test]
    #[should_panic]
    fn test_div_zero() {
        let _ = P25Codeword::for_power(3) / P25Codeword::default();
    }

    #[test]
    fn test_eval() {
        let p = TestPolynomial::new((0..3).map(|_| P25Codeword::for_power(0)));
        assert_eq!(p.eval(P25Codeword::for_power(1)), 0b000111);

        let p = TestPolynomial::new([
            P25Codeword::default(),
            P25Codeword::default(),
            P25Codeword::default(),
            P25Codeword::for_power(0),
        ].iter().cloned());
        assert_eq!(p.eval(P25Codeword::for_power(3)), 0b011000);
    }

    #[test]
    fn test_shift_degree() {
        let p = TestPolynomial::new([
            P25Codeword::default(),
            P25Codeword::for_power(4),
            P25Codeword::for_power(9),
        ].iter().cloned());

        assert_eq!(p.degree(), Some(2));

        let q = p.shift();
        assert_eq!(q.degree(), Some(1));
        assert_eq!(q.constant(), P25Codeword::for_power(4));
        assert_eq!(q.coef(1), P25Codeword::for_power(9));
        assert_eq!(TestPolynomial::default().degree(), None);
    }

    #[test]
    fn test_mul_deriv() {
        // (1 + x)(1 + x) = 1 + x^2
        let p = TestPolynomial::new((0..2).map(|_| P25Codeword::for_power(0)));
        let sq = p * p;

        assert_eq!(sq.coef(0), P25Codeword::for_power(0));
        assert!(sq.coef(1).zero());
        assert_eq!(sq.coef(2), P25Codeword::for_power(0));
        assert_eq!(sq.deriv().degree(), None);

        let d = TestPolynomial::new([
            P25Codeword::for_power(0),
            P25Codeword::for_power(5),
            P25Codeword::for_power(7),
            P25Codeword::for_power(2),
        ].iter().cloned()).deriv();

        assert_eq!(d.coef(0), P25Codeword::for_power(5));
        assert!(d.coef(1).zero());
        assert_eq!(d.coef(2), P25Codeword::for_power(2));
        assert_eq!(d.degree(), Some(2));
    }

    #[test]
    fn test_truncate() {
        let p = TestPolynomial::new((0..6).map(P25Codeword::for_power)).truncate(2);
        assert_eq!(p.degree(), Some(2));
    }
}
