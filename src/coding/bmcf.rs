//! Reed-Solomon error location and evaluation: Berlekamp-Massey, Chien search, and
//! Forney.
//!
//! Given the syndromes s<sub>i</sub> = r(α<sup>i</sup>), 1 ≤ i ≤ 2t, of a received
//! word r(x):
//!
//! 1. Berlekamp-Massey synthesizes the error locator Λ(x) = (1 + a<sub>1</sub>x) ···
//!    (1 + a<sub>e</sub>x) as the connection polynomial of the shortest LFSR that
//!    generates the syndrome sequence. e = deg Λ is the number of detected errors.
//! 2. Chien search evaluates Λ(α<sup>i</sup>) for every power i, updating each term
//!    by one multiplication per step instead of re-evaluating from scratch.
//! 3. If the number of roots differs from deg Λ the word has more than t errors and is
//!    unrecoverable.
//! 4. Forney gives each error pattern as Ω(x) / Λ'(x) at the root, where Ω(x) =
//!    Λ(x)s(x) mod x<sup>2t</sup>.
//!
//! The Berlekamp-Massey variant follows Hankerson et al, *Coding Theory and
//! Cryptography: The Essentials*, 2000.

use collect_slice::CollectSlice;

use crate::coding::galois::{GaloisField, P25Codeword, P25Field, Polynomial, PolynomialCoefs};

/// Builds Λ(x) from s(x).
struct ErrorLocator<P: PolynomialCoefs> {
    /// Saved and current p polynomials.
    p_saved: Polynomial<P>,
    p_cur: Polynomial<P>,
    /// Saved and current q polynomials.
    q_saved: Polynomial<P>,
    q_cur: Polynomial<P>,
    /// Degree terms D associated with the saved and current p.
    deg_saved: usize,
    deg_cur: usize,
}

impl<P: PolynomialCoefs> ErrorLocator<P> {
    fn new(syn: Polynomial<P>) -> ErrorLocator<P> {
        ErrorLocator {
            // 1 + s(x)
            q_saved: Polynomial::new(
                std::iter::once(P25Codeword::for_power(0))
                    .chain(syn.iter().take(P::syndromes()).cloned())
            ),
            q_cur: syn,
            // x^{2t+1} and x^{2t}
            p_saved: Polynomial::unit_power(P::syndromes() + 1),
            p_cur: Polynomial::unit_power(P::syndromes()),
            deg_saved: 0,
            deg_cur: 1,
        }
    }

    fn build(mut self) -> Polynomial<P> {
        for _ in 0..P::syndromes() {
            self.step();
        }

        self.p_cur
    }

    fn step(&mut self) {
        let (save, q, p, d) = if self.q_cur.constant().zero() {
            (false, self.q_cur.shift(), self.p_cur.shift(), 2 + self.deg_cur)
        } else {
            let mult = self.q_cur.constant() / self.q_saved.constant();

            (
                self.deg_cur >= self.deg_saved,
                (self.q_cur + self.q_saved * mult).shift(),
                (self.p_cur + self.p_saved * mult).shift(),
                2 + std::cmp::min(self.deg_cur, self.deg_saved),
            )
        };

        if save {
            self.q_saved = self.q_cur;
            self.p_saved = self.p_cur;
            self.deg_saved = self.deg_cur;
        }

        self.q_cur = q;
        self.p_cur = p;
        self.deg_cur = d;
    }
}

/// Iterates over the roots α<sup>i</sup> of Λ(x) by Chien search.
struct PolynomialRoots<P: PolynomialCoefs> {
    /// Terms Λ<sub>k</sub>α<sup>ik</sup> for the current power i; their sum is
    /// Λ(α<sup>i</sup>).
    terms: Polynomial<P>,
    pow: std::ops::Range<usize>,
}

impl<P: PolynomialCoefs> PolynomialRoots<P> {
    fn new(loc: Polynomial<P>) -> Self {
        PolynomialRoots {
            terms: loc,
            pow: 0..P25Field::size(),
        }
    }
}

impl<P: PolynomialCoefs> Iterator for PolynomialRoots<P> {
    type Item = P25Codeword;

    fn next(&mut self) -> Option<Self::Item> {
        for pow in self.pow.by_ref() {
            let eval = self.terms.iter().fold(P25Codeword::default(), |s, &x| s + x);

            for (k, term) in self.terms.iter_mut().enumerate() {
                *term = *term * P25Codeword::for_power(k);
            }

            if eval.zero() {
                return Some(P25Codeword::for_power(pow));
            }
        }

        None
    }
}

/// Error locations and patterns of a received word.
pub struct Errors<P: PolynomialCoefs> {
    /// Buffered roots of Λ(x); the polynomial type is only used as storage.
    roots: Polynomial<P>,
    /// Λ'(x)
    deriv: Polynomial<P>,
    /// Ω(x)
    vals: Polynomial<P>,
    pos: std::ops::Range<usize>,
}

impl<P: PolynomialCoefs> Errors<P> {
    /// Locate the errors described by the given syndrome polynomial.
    ///
    /// Return `Some((count, errors))` on success or `None` if the word has more errors
    /// than the code can correct.
    pub fn new(syn: Polynomial<P>) -> Option<(usize, Self)> {
        let loc = ErrorLocator::new(syn).build();
        let errors = loc.degree()?;

        if errors > P::errors() {
            return None;
        }

        // Roots are buffered first since a root count that disagrees with the degree
        // means none of them can be used (dividing by Λ' could hit zero.)
        let mut roots = Polynomial::<P>::default();
        let found = PolynomialRoots::new(loc).collect_slice_exhaust(&mut roots[..]);

        if found != errors {
            return None;
        }

        Some((errors, Errors {
            roots,
            deriv: loc.deriv(),
            vals: (loc * syn).truncate(P::syndromes() - 1),
            pos: 0..errors,
        }))
    }
}

/// Yields `(location, pattern)` for each error, where the location is the degree of the
/// erroneous term in the received polynomial.
impl<P: PolynomialCoefs> Iterator for Errors<P> {
    type Item = (usize, P25Codeword);

    fn next(&mut self) -> Option<Self::Item> {
        self.pos.next().and_then(|i| {
            let root = self.roots[i];
            let deriv = self.deriv.eval(root);

            if deriv.zero() {
                return None;
            }

            // Λ(α^i) = 0 puts the error at degree -i modulo the field.
            root.invert().power().map(|loc| (loc, self.vals.eval(root) / deriv))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    impl_polynomial_coefs!(TestCoefs, 9);
    type TestPolynomial = Polynomial<TestCoefs>;

    #[test]
    fn test_roots() {
        // (1+α^42x)(1+α^13x)(1+α^57x)
        let p = TestPolynomial::new([
            P25Codeword::for_power(0),
            P25Codeword::for_power(42),
        ].iter().cloned()) * TestPolynomial::new([
            P25Codeword::for_power(0),
            P25Codeword::for_power(13),
        ].iter().cloned()) * TestPolynomial::new([
            P25Codeword::for_power(0),
            P25Codeword::for_power(57),
        ].iter().cloned());

        let roots: Vec<P25Codeword> = PolynomialRoots::new(p).collect();

        assert_eq!(roots.len(), 3);
        assert!(roots.contains(&P25Codeword::for_power(42).invert()));
        assert!(roots.contains(&P25Codeword::for_power(13).invert()));
        assert!(roots.contains(&P25Codeword::for_power(57).invert()));

        assert_eq!(PolynomialRoots::new(TestPolynomial::unit_power(0)).count(), 0);
    }

    #[test]
    fn test_single_error() {
        // r(x) = α^5 x^7, a lone error at degree 7 in an otherwise zero word.
        let syn = TestPolynomial::new((1..=TestCoefs::syndromes()).map(|pow| {
            P25Codeword::for_power(5) * P25Codeword::for_power(7 * pow)
        }));

        let (count, mut errs) = Errors::new(syn).expect("decodable");
        assert_eq!(count, 1);
        assert_eq!(errs.next(), Some((7, P25Codeword::for_power(5))));
        assert_eq!(errs.next(), None);
    }
}
