//! Ed25519 compressed-point validity check for the address deriver.
//!
//! A derived record address must not be a usable signing key, so candidate
//! digests are rejected until one fails point decompression. The check is the
//! standard one: interpret the 32 bytes as a compressed point (255-bit `y`
//! plus a sign bit), recover `x² = (y² − 1)/(d·y² + 1)` and test whether a
//! square root exists.
//!
//! Field arithmetic is self-contained: four 64-bit limbs, products reduced
//! with 2²⁵⁶ ≡ 38 (mod p), exponentiation by square-and-multiply.

/// p = 2²⁵⁵ − 19, little-endian limbs.
const P: [u64; 4] = [
    0xffff_ffff_ffff_ffed,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
];

/// Twisted Edwards constant d = −121665/121666 (mod p).
const D: Fe = Fe([
    0x75eb_4dca_1359_78a3,
    0x0070_0a4d_4141_d8ab,
    0x8cc7_4079_7779_e898,
    0x5203_6cee_2b6f_fe73,
]);

/// √−1 = 2^((p−1)/4) (mod p).
const SQRT_M1: Fe = Fe([
    0xc4ee_1b27_4a0e_a0b0,
    0x2f43_1806_ad2f_e478,
    0x2b4d_0099_3dfb_d7a7,
    0x2b83_2480_4fc1_df0b,
]);

/// (p − 5)/8 = 2²⁵² − 3, the exponent of the square-root candidate.
const SQRT_EXP: [u64; 4] = [
    0xffff_ffff_ffff_fffd,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x0fff_ffff_ffff_ffff,
];

/// Field element mod 2²⁵⁵ − 19. Always kept fully reduced.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Fe([u64; 4]);

#[inline]
fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + b as u128 + carry as u128;
    (t as u64, (t >> 64) as u64)
}

#[inline]
fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let t = (a as u128).wrapping_sub(b as u128 + borrow as u128);
    (t as u64, ((t >> 64) as u64) & 1)
}

fn gte(a: &[u64; 4], b: &[u64; 4]) -> bool {
    for i in (0..4).rev() {
        if a[i] > b[i] {
            return true;
        }
        if a[i] < b[i] {
            return false;
        }
    }
    true
}

fn sub4(a: &[u64; 4], b: &[u64; 4]) -> [u64; 4] {
    let mut out = [0u64; 4];
    let mut borrow = 0u64;
    for i in 0..4 {
        let (v, br) = sbb(a[i], b[i], borrow);
        out[i] = v;
        borrow = br;
    }
    out
}

impl Fe {
    pub const ZERO: Fe = Fe([0, 0, 0, 0]);
    pub const ONE: Fe = Fe([1, 0, 0, 0]);

    /// Small scalar constructor, handy for constants and tests.
    pub const fn from_u64(v: u64) -> Fe {
        Fe([v, 0, 0, 0])
    }

    /// Decode 32 little-endian bytes: mask the sign bit, reduce mod p.
    pub fn from_bytes(bytes: &[u8; 32]) -> Fe {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let mut limb = 0u64;
            for j in 0..8 {
                limb |= (bytes[i * 8 + j] as u64) << (8 * j);
            }
            limbs[i] = limb;
        }
        limbs[3] &= 0x7fff_ffff_ffff_ffff;
        // Value is below 2²⁵⁵, so a single conditional subtraction reduces it.
        if gte(&limbs, &P) {
            limbs = sub4(&limbs, &P);
        }
        Fe(limbs)
    }

    pub fn is_zero(&self) -> bool {
        *self == Fe::ZERO
    }

    pub fn add(&self, other: &Fe) -> Fe {
        let mut out = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            let (v, c) = adc(self.0[i], other.0[i], carry);
            out[i] = v;
            carry = c;
        }
        // Both inputs are below p, so the sum is below 2p and fits 256 bits.
        if gte(&out, &P) {
            out = sub4(&out, &P);
        }
        Fe(out)
    }

    pub fn sub(&self, other: &Fe) -> Fe {
        if gte(&self.0, &other.0) {
            Fe(sub4(&self.0, &other.0))
        } else {
            let shifted = Fe(sub4(&P, &other.0));
            self.add(&shifted)
        }
    }

    pub fn neg(&self) -> Fe {
        Fe::ZERO.sub(self)
    }

    pub fn mul(&self, other: &Fe) -> Fe {
        // Schoolbook 4×4 multiply into 8 limbs.
        let mut wide = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let t = wide[i + j] as u128
                    + (self.0[i] as u128) * (other.0[j] as u128)
                    + carry;
                wide[i + j] = t as u64;
                carry = t >> 64;
            }
            wide[i + 4] = carry as u64;
        }

        // Fold the high half with 2²⁵⁶ ≡ 38 (mod p).
        let mut out = [0u64; 4];
        let mut carry: u128 = 0;
        for k in 0..4 {
            let t = wide[k] as u128 + (wide[k + 4] as u128) * 38 + carry;
            out[k] = t as u64;
            carry = t >> 64;
        }
        let mut extra = (carry as u64).wrapping_mul(38);
        loop {
            let (v, c0) = adc(out[0], extra, 0);
            out[0] = v;
            let mut c = c0;
            for k in 1..4 {
                let (v, ck) = adc(out[k], 0, c);
                out[k] = v;
                c = ck;
            }
            if c == 0 {
                break;
            }
            extra = 38;
        }
        while gte(&out, &P) {
            out = sub4(&out, &P);
        }
        Fe(out)
    }

    pub fn square(&self) -> Fe {
        self.mul(self)
    }

    /// Exponentiation by a fixed 256-bit exponent, square-and-multiply.
    pub fn pow(&self, exp: &[u64; 4]) -> Fe {
        let mut acc = Fe::ONE;
        for i in (0..4).rev() {
            for bit in (0..64).rev() {
                acc = acc.square();
                if (exp[i] >> bit) & 1 == 1 {
                    acc = acc.mul(self);
                }
            }
        }
        acc
    }
}

/// Whether 32 bytes decode to a valid curve point (i.e. a possible public key).
///
/// The deriver keeps decrementing its bump until this returns false.
pub fn is_valid_point(bytes: &[u8; 32]) -> bool {
    let sign = bytes[31] >> 7;
    let y = Fe::from_bytes(bytes);

    let yy = y.square();
    let u = yy.sub(&Fe::ONE);
    let v = yy.mul(&D).add(&Fe::ONE);

    // Candidate root x = u·v³·(u·v⁷)^((p−5)/8).
    let v3 = v.square().mul(&v);
    let v7 = v3.square().mul(&v);
    let mut x = u.mul(&v3).mul(&u.mul(&v7).pow(&SQRT_EXP));

    let vxx = v.mul(&x.square());
    if vxx == u {
        // x is the root.
    } else if vxx == u.neg() {
        x = x.mul(&SQRT_M1);
    } else {
        return false;
    }

    // x = 0 admits no odd encoding.
    !(x.is_zero() && sign == 1)
}
