//! Encoding and decoding of the (24, 12, 13) short, (24, 16, 9) medium, and (36, 20, 17)
//! long Reed-Solomon codes over GF(2<sup>6</sup>).
//!
//! All three are shortened from the (63, 47, 17) family: the missing leading symbols
//! are taken as zero. Words are held in transmission order (first data symbol first),
//! which maps the first symbol to the highest-degree term of the received polynomial.

use collect_slice::CollectSlice;

use crate::bits::Hexbit;
use crate::coding::bmcf;
use crate::coding::galois::{P25Codeword, Polynomial, PolynomialCoefs};

impl_polynomial_coefs!(ShortCoefs, 13, 24);
impl_polynomial_coefs!(MedCoefs, 9, 24);
impl_polynomial_coefs!(LongCoefs, 17, 36);

/// The (24, 12, 13) code protecting link control words.
pub mod short {
    use super::*;

    /// Transpose of the LC generator, parity part.
    const GEN: [[u8; 12]; 12] = [
        [0o62, 0o11, 0o03, 0o21, 0o30, 0o01, 0o61, 0o24, 0o72, 0o72, 0o73, 0o71],
        [0o44, 0o12, 0o01, 0o70, 0o22, 0o41, 0o76, 0o22, 0o42, 0o14, 0o65, 0o05],
        [0o03, 0o11, 0o05, 0o27, 0o03, 0o27, 0o21, 0o71, 0o05, 0o65, 0o36, 0o55],
        [0o25, 0o11, 0o75, 0o45, 0o75, 0o56, 0o55, 0o56, 0o20, 0o54, 0o61, 0o03],
        [0o14, 0o16, 0o14, 0o16, 0o15, 0o76, 0o76, 0o21, 0o43, 0o35, 0o42, 0o71],
        [0o16, 0o64, 0o06, 0o67, 0o15, 0o64, 0o01, 0o35, 0o47, 0o25, 0o22, 0o34],
        [0o27, 0o67, 0o20, 0o23, 0o33, 0o21, 0o63, 0o73, 0o33, 0o41, 0o17, 0o60],
        [0o03, 0o55, 0o44, 0o64, 0o15, 0o53, 0o35, 0o42, 0o56, 0o16, 0o04, 0o11],
        [0o53, 0o01, 0o66, 0o73, 0o51, 0o04, 0o30, 0o57, 0o01, 0o15, 0o44, 0o74],
        [0o04, 0o76, 0o06, 0o33, 0o03, 0o25, 0o13, 0o74, 0o16, 0o40, 0o20, 0o02],
        [0o36, 0o26, 0o70, 0o44, 0o53, 0o01, 0o64, 0o43, 0o13, 0o71, 0o25, 0o41],
        [0o47, 0o73, 0o66, 0o21, 0o50, 0o12, 0o70, 0o76, 0o76, 0o26, 0o05, 0o50],
    ];

    /// Fill in the last 12 parity hexbits from the first 12 data hexbits.
    pub fn encode(buf: &mut [Hexbit; 24]) {
        let (data, parity) = buf.split_at_mut(12);
        super::encode(data, parity, GEN.iter().map(|r| &r[..]));
    }

    /// Correct up to 6 hexbit errors in place, returning the number corrected or `None`
    /// if the word is unrecoverable (in which case it is left untouched.)
    pub fn decode(buf: &mut [Hexbit; 24]) -> Option<usize> {
        super::decode::<ShortCoefs>(&mut buf[..])
    }
}

/// The (24, 16, 9) code protecting encryption sync words.
pub mod medium {
    use super::*;

    /// Transpose of the ES generator, parity part.
    const GEN: [[u8; 16]; 8] = [
        [0o51, 0o57, 0o05, 0o73, 0o75, 0o20, 0o02, 0o24, 0o42, 0o32, 0o65, 0o64, 0o62, 0o55, 0o24, 0o67],
        [0o45, 0o25, 0o01, 0o07, 0o15, 0o32, 0o75, 0o74, 0o64, 0o32, 0o36, 0o06, 0o63, 0o43, 0o23, 0o75],
        [0o67, 0o63, 0o31, 0o47, 0o51, 0o14, 0o43, 0o15, 0o07, 0o55, 0o25, 0o54, 0o74, 0o34, 0o23, 0o45],
        [0o15, 0o73, 0o04, 0o14, 0o51, 0o42, 0o05, 0o72, 0o22, 0o41, 0o07, 0o32, 0o70, 0o71, 0o05, 0o60],
        [0o64, 0o71, 0o16, 0o41, 0o17, 0o75, 0o01, 0o24, 0o61, 0o57, 0o50, 0o76, 0o05, 0o57, 0o50, 0o57],
        [0o67, 0o22, 0o54, 0o77, 0o67, 0o42, 0o40, 0o26, 0o20, 0o66, 0o16, 0o46, 0o27, 0o76, 0o70, 0o24],
        [0o52, 0o40, 0o25, 0o47, 0o17, 0o70, 0o12, 0o74, 0o40, 0o21, 0o40, 0o14, 0o37, 0o50, 0o42, 0o06],
        [0o12, 0o15, 0o76, 0o11, 0o57, 0o54, 0o64, 0o61, 0o65, 0o77, 0o51, 0o36, 0o46, 0o64, 0o23, 0o26],
    ];

    /// Fill in the last 8 parity hexbits from the first 16 data hexbits.
    pub fn encode(buf: &mut [Hexbit; 24]) {
        let (data, parity) = buf.split_at_mut(16);
        super::encode(data, parity, GEN.iter().map(|r| &r[..]));
    }

    /// Correct up to 4 hexbit errors in place, returning the number corrected or `None`
    /// if the word is unrecoverable (in which case it is left untouched.)
    pub fn decode(buf: &mut [Hexbit; 24]) -> Option<usize> {
        super::decode::<MedCoefs>(&mut buf[..])
    }
}

/// The (36, 20, 17) code protecting voice headers.
pub mod long {
    use super::*;

    /// Transpose of the header generator, parity part.
    const GEN: [[u8; 20]; 16] = [
        [0o74, 0o04, 0o07, 0o26, 0o23, 0o24, 0o52, 0o55, 0o54, 0o74, 0o54, 0o51, 0o01, 0o11, 0o06, 0o34, 0o63, 0o71, 0o02, 0o34],
        [0o37, 0o17, 0o23, 0o05, 0o73, 0o51, 0o33, 0o62, 0o51, 0o41, 0o70, 0o07, 0o65, 0o70, 0o02, 0o31, 0o43, 0o21, 0o01, 0o35],
        [0o34, 0o50, 0o37, 0o07, 0o73, 0o25, 0o14, 0o56, 0o32, 0o30, 0o11, 0o72, 0o32, 0o05, 0o65, 0o01, 0o25, 0o70, 0o53, 0o02],
        [0o06, 0o24, 0o46, 0o63, 0o41, 0o23, 0o02, 0o25, 0o65, 0o41, 0o03, 0o30, 0o70, 0o10, 0o11, 0o15, 0o44, 0o44, 0o74, 0o23],
        [0o02, 0o11, 0o56, 0o63, 0o72, 0o22, 0o20, 0o73, 0o77, 0o43, 0o13, 0o65, 0o13, 0o65, 0o41, 0o44, 0o77, 0o56, 0o02, 0o21],
        [0o07, 0o05, 0o75, 0o27, 0o34, 0o41, 0o06, 0o60, 0o12, 0o22, 0o22, 0o54, 0o44, 0o24, 0o20, 0o64, 0o63, 0o04, 0o14, 0o27],
        [0o44, 0o30, 0o43, 0o63, 0o21, 0o74, 0o14, 0o15, 0o54, 0o51, 0o16, 0o06, 0o73, 0o15, 0o45, 0o16, 0o17, 0o30, 0o52, 0o22],
        [0o64, 0o57, 0o45, 0o40, 0o51, 0o66, 0o25, 0o30, 0o13, 0o06, 0o57, 0o21, 0o24, 0o77, 0o42, 0o24, 0o17, 0o74, 0o74, 0o33],
        [0o26, 0o33, 0o55, 0o06, 0o67, 0o74, 0o52, 0o13, 0o35, 0o64, 0o03, 0o36, 0o12, 0o22, 0o46, 0o52, 0o64, 0o04, 0o12, 0o64],
        [0o14, 0o03, 0o21, 0o04, 0o16, 0o65, 0o23, 0o17, 0o32, 0o33, 0o45, 0o63, 0o52, 0o24, 0o54, 0o16, 0o14, 0o23, 0o57, 0o42],
        [0o26, 0o02, 0o50, 0o40, 0o31, 0o70, 0o35, 0o20, 0o56, 0o03, 0o72, 0o50, 0o21, 0o24, 0o35, 0o06, 0o40, 0o71, 0o24, 0o05],
        [0o44, 0o02, 0o31, 0o45, 0o74, 0o36, 0o74, 0o02, 0o12, 0o47, 0o31, 0o61, 0o55, 0o74, 0o12, 0o62, 0o74, 0o70, 0o63, 0o73],
        [0o54, 0o15, 0o45, 0o47, 0o11, 0o67, 0o75, 0o70, 0o75, 0o27, 0o30, 0o64, 0o12, 0o07, 0o40, 0o20, 0o31, 0o63, 0o15, 0o51],
        [0o13, 0o16, 0o27, 0o30, 0o21, 0o45, 0o75, 0o55, 0o01, 0o12, 0o56, 0o52, 0o35, 0o44, 0o64, 0o13, 0o72, 0o45, 0o42, 0o46],
        [0o77, 0o25, 0o71, 0o75, 0o12, 0o64, 0o43, 0o14, 0o72, 0o55, 0o35, 0o01, 0o14, 0o07, 0o65, 0o55, 0o54, 0o56, 0o52, 0o73],
        [0o05, 0o26, 0o62, 0o07, 0o21, 0o01, 0o27, 0o47, 0o63, 0o47, 0o22, 0o60, 0o72, 0o46, 0o33, 0o57, 0o06, 0o43, 0o33, 0o60],
    ];

    /// Fill in the last 16 parity hexbits from the first 20 data hexbits.
    pub fn encode(buf: &mut [Hexbit; 36]) {
        let (data, parity) = buf.split_at_mut(20);
        super::encode(data, parity, GEN.iter().map(|r| &r[..]))
    }

    /// Correct up to 8 hexbit errors in place, returning the number corrected or `None`
    /// if the word is unrecoverable (in which case it is left untouched.)
    pub fn decode(buf: &mut [Hexbit; 36]) -> Option<usize> {
        super::decode::<LongCoefs>(&mut buf[..])
    }
}

/// Multiply the data symbols by each generator row to produce the parity symbols.
fn encode<'g, G>(data: &[Hexbit], parity: &mut [Hexbit], gen: G)
    where G: Iterator<Item = &'g [u8]>
{
    gen.map(|row| {
        row.iter()
           .zip(data.iter())
           .fold(P25Codeword::default(), |s, (&col, &d)| {
               s + P25Codeword::new(d.bits()) * P25Codeword::new(col)
           }).bits()
    }).map(Hexbit::new).collect_slice_checked(parity);
}

fn decode<P: PolynomialCoefs>(word: &mut [Hexbit]) -> Option<usize> {
    let poly = Polynomial::<P>::new(word.iter().rev().map(|&b| {
        P25Codeword::new(b.bits())
    }));

    let syn = Polynomial::<P>::new((1..=P::syndromes()).map(|pow| {
        poly.eval(P25Codeword::for_power(pow))
    }));

    if syn.iter().all(|s| s.zero()) {
        return Some(0);
    }

    let (count, errors) = bmcf::Errors::<P>::new(syn)?;

    // Collect every fix before touching the word so a failure leaves it intact. An
    // error located in the zero-padded, shortened-away region can't be real.
    let fixes = errors
        .map(|(loc, pat)| if loc < word.len() { Some((loc, pat)) } else { None })
        .collect::<Option<Vec<_>>>()?;

    if fixes.len() != count {
        return None;
    }

    let last = word.len() - 1;

    for (loc, pat) in fixes {
        let sym = &mut word[last - loc];
        *sym = Hexbit::new((P25Codeword::new(sym.bits()) + pat).bits());
    }

    Some(count)
}
