//! Self-delimiting bit-string codec for transferable terms.
//!
//! `modulate` turns a term built from numbers, `nil` and pairs into a string
//! of `0`/`1` characters; `demodulate` is its exact left inverse and hands
//! back the unconsumed remainder so pairs can chain decodes from one buffer.
//!
//! Framing rules:
//! - `nil` → `00`
//! - number → sign tag (`01` non-negative, `10` negative), then a unary
//!   length prefix (one `1` per 4-bit group of the magnitude) closed by `0`,
//!   then the magnitude as minimal big-endian binary left-padded to a nibble
//!   multiple. A zero magnitude is just the bare `0` terminator.
//! - pair → `11` + modulate(car) + modulate(cdr)

use std::rc::Rc;

use thiserror::Error;

use crate::term::Term;

/// Errors returned while encoding or decoding a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Only numbers, `nil` and pairs have a wire representation.
    #[error("cannot modulate `{0}`: only numbers, nil and pairs have a wire form")]
    Unmodulatable(String),
    /// Bit-level framing violation while decoding.
    #[error("cannot demodulate: {0}")]
    Decode(&'static str),
    /// A top-level decode left unconsumed bits behind.
    #[error("unexpected trailer after decode: {0:?}")]
    Trailer(String),
}

/// Alias résultat du codec.
pub type CodecResult<T> = Result<T, CodecError>;

/// Encode a transferable term into its bit-string form.
pub fn modulate(term: &Term) -> CodecResult<String> {
    let mut out = String::new();
    modulate_into(term, &mut out)?;
    Ok(out)
}

fn modulate_into(term: &Term, out: &mut String) -> CodecResult<()> {
    match term {
        Term::Nil => out.push_str("00"),
        Term::Number(v) => {
            out.push_str(if *v < 0 { "10" } else { "01" });
            let mag = v.unsigned_abs();
            if mag == 0 {
                out.push('0');
                return Ok(());
            }
            let mut bits = format!("{mag:b}");
            while bits.len() % 4 != 0 {
                bits.insert(0, '0');
            }
            for _ in 0..bits.len() / 4 {
                out.push('1');
            }
            out.push('0');
            out.push_str(&bits);
        }
        Term::Pair(car, cdr) => {
            out.push_str("11");
            modulate_into(car, out)?;
            modulate_into(cdr, out)?;
        }
        other => return Err(CodecError::Unmodulatable(other.to_string())),
    }
    Ok(())
}

/// Decode one term from the front of `s`, returning the remainder.
pub fn demodulate(s: &str) -> CodecResult<(Term, &str)> {
    let tag = s.get(0..2).ok_or(CodecError::Decode("missing tag"))?;
    match tag {
        "00" => Ok((Term::Nil, &s[2..])),
        "01" | "10" => {
            let sign = if tag == "10" { -1 } else { 1 };
            let rest = &s[2..];
            let nibbles = rest.bytes().take_while(|b| *b == b'1').count();
            if rest.as_bytes().get(nibbles) != Some(&b'0') {
                return Err(CodecError::Decode("missing length terminator"));
            }
            let width = nibbles * 4;
            let field = rest
                .get(nibbles + 1..nibbles + 1 + width)
                .ok_or(CodecError::Decode("magnitude field truncated"))?;
            let magnitude = if width == 0 {
                0
            } else {
                i64::from_str_radix(field, 2)
                    .map_err(|_| CodecError::Decode("magnitude does not fit a 64-bit integer"))?
            };
            Ok((Term::Number(sign * magnitude), &rest[nibbles + 1 + width..]))
        }
        "11" => {
            let (car, rest) = demodulate(&s[2..])?;
            let (cdr, rest) = demodulate(rest)?;
            Ok((Term::Pair(Rc::new(car), Rc::new(cdr)), rest))
        }
        _ => Err(CodecError::Decode("bad tag")),
    }
}

/// Decode a complete payload, rejecting trailing bits.
pub fn demodulate_all(s: &str) -> CodecResult<Term> {
    let (term, rest) = demodulate(s)?;
    if rest.is_empty() {
        Ok(term)
    } else {
        Err(CodecError::Trailer(rest.to_owned()))
    }
}
