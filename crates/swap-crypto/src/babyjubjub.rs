//! BabyJubjub twisted Edwards curve arithmetic.
//!
//! Curve equation: `a*x^2 + y^2 = 1 + d*x^2*y^2` over the BN254 scalar field,
//! with `a = -1` and the gnark-crypto generator.

use ark_bn254::Fr;
use ark_ff::{AdditiveGroup, BigInteger, Field, MontFp, PrimeField};
use num_bigint::BigUint;
use swap_types::{Result, SwapError};

/// Affine point `(x, y)`.
pub type Point = (Fr, Fr);

const CURVE_D: Fr =
    MontFp!("12181644023421730124874158521699555681764249180949974110617291017600649128846");

const GENERATOR_X: Fr =
    MontFp!("9671717474070082183213120605117400219616337014328744928644933853176787189663");
const GENERATOR_Y: Fr =
    MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203");

/// Prime subgroup order `l`, big-endian.
/// l = 2736030358979909402780800718157159386076813972158567259200215660948447373041
const SUBGROUP_ORDER_BE: [u8; 32] = [
    0x06, 0x0c, 0x89, 0xce, 0x5c, 0x26, 0x34, 0x05, 0x37, 0x0a, 0x08, 0xb6, 0xd0, 0x30, 0x2b,
    0x0b, 0xab, 0x3e, 0xed, 0xb8, 0x39, 0x20, 0xee, 0x0a, 0x67, 0x72, 0x97, 0xdc, 0x39, 0x21,
    0x26, 0xf1,
];

pub fn subgroup_order() -> BigUint {
    BigUint::from_bytes_be(&SUBGROUP_ORDER_BE)
}

fn curve_a() -> Fr {
    -Fr::ONE
}

pub fn generator() -> Point {
    (GENERATOR_X, GENERATOR_Y)
}

pub fn identity() -> Point {
    (Fr::ZERO, Fr::ONE)
}

pub fn is_on_curve(p: &Point) -> bool {
    let (x, y) = p;
    let x2 = x.square();
    let y2 = y.square();
    curve_a() * x2 + y2 == Fr::ONE + CURVE_D * x2 * y2
}

/// Unified twisted Edwards addition. Complete for BabyJubjub since `a` is a
/// square and `d` is not, so the denominators never vanish.
pub fn add(p1: &Point, p2: &Point) -> Point {
    let (x1, y1) = *p1;
    let (x2, y2) = *p2;

    let x1x2 = x1 * x2;
    let y1y2 = y1 * y2;
    let dxy = CURVE_D * x1x2 * y1y2;

    let x3 = (x1 * y2 + y1 * x2) * (Fr::ONE + dxy).inverse().unwrap_or(Fr::ZERO);
    let y3 = (y1y2 - curve_a() * x1x2) * (Fr::ONE - dxy).inverse().unwrap_or(Fr::ZERO);
    (x3, y3)
}

/// Double-and-add, least significant bit first.
pub fn mul(base: &Point, scalar: &BigUint) -> Point {
    let mut result = identity();
    let mut current = *base;
    for i in 0..scalar.bits() {
        if scalar.bit(i) {
            result = add(&result, &current);
        }
        current = add(&current, &current);
    }
    result
}

pub fn mul_generator(scalar: &BigUint) -> Point {
    mul(&generator(), scalar)
}

/// gnark-crypto sign convention: `x` is "negative" when it exceeds `-x`.
fn is_lexicographically_largest(x: &Fr) -> bool {
    x.into_bigint() > (-*x).into_bigint()
}

/// Little-endian Y with the X sign flag in the top bit of byte 31.
pub fn compress(p: &Point) -> Result<[u8; 32]> {
    if !is_on_curve(p) {
        return Err(SwapError::PointNotOnCurve);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&p.1.into_bigint().to_bytes_le());
    if is_lexicographically_largest(&p.0) {
        out[31] |= 0x80;
    }
    Ok(out)
}

pub fn decompress(compressed: &[u8; 32]) -> Result<Point> {
    let x_flag = compressed[31] & 0x80 != 0;
    let mut y_bytes = *compressed;
    y_bytes[31] &= 0x7f;

    let y = Fr::from_le_bytes_mod_order(&y_bytes);
    if y.into_bigint().to_bytes_le() != y_bytes {
        return Err(SwapError::InvalidCompressedPoint(
            "y coordinate is not reduced".into(),
        ));
    }

    // x^2 = (1 - y^2) / (a - d*y^2)
    let y2 = y.square();
    let denominator = (curve_a() - CURVE_D * y2)
        .inverse()
        .ok_or(SwapError::NoSquareRoot)?;
    let x2 = (Fr::ONE - y2) * denominator;
    let mut x = x2.sqrt().ok_or(SwapError::NoSquareRoot)?;
    if is_lexicographically_largest(&x) != x_flag {
        x = -x;
    }

    let point = (x, y);
    if !is_on_curve(&point) {
        return Err(SwapError::PointNotOnCurve);
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_on_curve() {
        assert!(is_on_curve(&generator()));
        assert!(is_on_curve(&identity()));
    }

    #[test]
    fn test_mul_zero_and_one() {
        assert_eq!(mul_generator(&BigUint::from(0u32)), identity());
        assert_eq!(mul_generator(&BigUint::from(1u32)), generator());
    }

    #[test]
    fn test_add_identity() {
        let g = generator();
        assert_eq!(add(&identity(), &g), g);
        assert_eq!(add(&g, &identity()), g);
    }

    #[test]
    fn test_5g_plus_7g_equals_12g() {
        let p5 = mul_generator(&BigUint::from(5u32));
        let p7 = mul_generator(&BigUint::from(7u32));
        assert_eq!(add(&p5, &p7), mul_generator(&BigUint::from(12u32)));
    }

    #[test]
    fn test_order_annihilates_generator() {
        assert_eq!(mul_generator(&subgroup_order()), identity());
    }

    #[test]
    fn test_compress_decompress_roundtrip() {
        for k in [1u32, 2, 42, 65_537] {
            let point = mul_generator(&BigUint::from(k));
            let compressed = compress(&point).unwrap();
            assert_eq!(decompress(&compressed).unwrap(), point);
        }
    }

    #[test]
    fn test_compress_rejects_off_curve() {
        let bogus = (Fr::from(1u64), Fr::from(1u64));
        assert!(matches!(compress(&bogus), Err(SwapError::PointNotOnCurve)));
    }
}
